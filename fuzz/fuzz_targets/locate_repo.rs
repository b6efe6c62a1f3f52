// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 IssueLens Contributors

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok((owner, repo)) = issuelens_core::locate(s) {
            assert!(!owner.is_empty());
            assert!(!repo.is_empty());
            assert!(!owner.contains('/'));
            assert!(!repo.contains('/'));
        }
    }
});
