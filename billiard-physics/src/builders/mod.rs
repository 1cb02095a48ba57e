// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Standard table and rack layouts
//!
//! Builders produce plain objects; combine them into a scene with
//! [`table::Table::scene`].

pub mod rack;
pub mod table;

pub use rack::{triangle_rack, RackConfig, CUE_BALL_ID};
pub use table::{convex_hull, eight_pool_table, Table, TableDimensions};
