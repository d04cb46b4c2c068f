// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use darkbio_ohttp::KeyConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Accepted configurations must be canonical
    if let Ok(config) = KeyConfig::decode(data) {
        assert_eq!(config.encode(), data, "re-encoded configuration differs");
    }
    // Parsed lists must re-encode to a list that parses the same
    if let Ok(list) = KeyConfig::decode_list(data) {
        let encoded = KeyConfig::encode_list(list.configs()).expect("failed to re-encode list");
        let decoded = KeyConfig::decode_list(&encoded).expect("failed to decode re-encoded list");
        assert_eq!(list.configs(), decoded.configs());
    }
});
