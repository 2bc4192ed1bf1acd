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
//! error type macros shared by the JAKART crates

/// implement `From` conversions from foreign error types into String carrying variants of our own
/// error enums. This keeps our errors `Clone` and does not leak dependency types into our API:
/// ```
/// map_to_opaque_error!{ serde_json::Error => JakartDashError::JsonError }
/// map_to_opaque_error!{
///     url::ParseError => JakartDashError::UrlError,
///     tokio::time::error::Elapsed => JakartDashError::TimeoutError
/// }
/// ```
#[macro_export]
macro_rules! map_to_opaque_error {
    ( $( $from_error:ty => $to_error:ident :: $variant:ident ),+ $(,)? ) => {
        $(
            impl From<$from_error> for $to_error {
                fn from (e: $from_error)->Self { $to_error :: $variant ( e.to_string()) }
            }
        )+
    };
}
pub use map_to_opaque_error;

/// define a thiserror enum with one line per variant:
/// ```
/// define_error!{ pub JakartCommonError =
///     IOError(#[from] std::io::Error) : "IO error: {0}",
///     NotFoundError(String) : "not found {0}"
/// }
/// ```
/// The resulting enum derives `thiserror::Error` and `Debug`, i.e. the using crate needs a thiserror dependency
#[macro_export]
macro_rules! define_error {
    ($vis:vis $name:ident = $( $variant:ident ( $( $( #[$attr:meta] )? $field:ty ),* ) : $msg:literal ),+ $(,)? ) => {
        #[derive(thiserror::Error,Debug)]
        $vis enum $name {
            $(
                #[error($msg)]
                $variant ( $( $(#[$attr])? $field ),* )
            ),+
        }
    }
}
pub use define_error;
