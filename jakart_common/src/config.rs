/*
 * Copyright © 2025, the JAKART developers. All rights reserved.
 *
 * The “JAKART” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

//! RON based configuration support.
//! Config structs are plain serde types (normally with `#[serde(default)]` and a `Default` impl carrying
//! site defaults). Files are looked up in the following order:
//!   1. `$JAKART_CONFIG_DIR/<filename>`
//!   2. `./local/config/<filename>` (development default)

use std::{env, fs, path::{Path,PathBuf}};
use serde::Deserialize;
use tracing::debug;
use crate::{JakartCommonError, Result};

pub const CONFIG_DIR_ENV: &str = "JAKART_CONFIG_DIR";
pub const LOCAL_CONFIG_DIR: &str = "local/config";

pub fn config_dirs ()->Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(2);
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() { dirs.push( PathBuf::from(dir)) }
    }
    dirs.push( PathBuf::from(LOCAL_CONFIG_DIR));
    dirs
}

pub fn find_config_file (filename: &str)->Option<PathBuf> {
    config_dirs().into_iter()
        .map( |dir| dir.join(filename))
        .find( |path| path.is_file())
}

/// load config from an explicit pathname
pub fn load_config_path<C,P> (path: P)->Result<C> where C: for<'a> Deserialize<'a>, P: AsRef<Path> {
    let data = fs::read( path.as_ref())?;
    debug!("loading config from {:?}", path.as_ref());
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// load config by filename, using our config dir lookup
pub fn load_config<C> (filename: &str)->Result<C> where C: for<'a> Deserialize<'a> {
    match find_config_file( filename) {
        Some(path) => load_config_path( path),
        None => Err( JakartCommonError::NotFoundError( format!("config file {filename}")))
    }
}
