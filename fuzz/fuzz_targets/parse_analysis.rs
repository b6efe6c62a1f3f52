// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 IssueLens Contributors

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(analysis) = issuelens_core::parse_analysis(s) {
            assert!((1..=5).contains(&analysis.priority_score));
            let unique: HashSet<_> = analysis.suggested_labels.iter().collect();
            assert_eq!(unique.len(), analysis.suggested_labels.len());
        }
    }
});
