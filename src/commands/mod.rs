// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod books;
pub mod categories;
pub mod entries;
pub mod insights;
pub mod importer;
pub mod exporter;
pub mod fx;
pub mod doctor;
pub mod ping;
