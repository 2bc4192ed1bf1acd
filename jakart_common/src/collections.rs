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

use std::collections::VecDeque;

/// push a new element to the end of a VecDeque used as a ringbuffer with an explicit bound.
/// Note that we can't rely on `VecDeque::capacity()` here since clones do not preserve it
#[inline]
pub fn push_bounded<T> (v: &mut VecDeque<T>, t: T, max_len: usize) {
    if max_len == 0 { return }
    while v.len() >= max_len {
        v.pop_front();
    }
    v.push_back(t)
}
