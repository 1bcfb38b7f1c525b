//! Fuzz target: `BridgeConfig` decoding
//!
//! Feeds arbitrary bytes to both config decoders and verifies:
//! - No panics under arbitrary byte inputs
//! - A JSON document that decodes has already passed validation
//! - A valid postcard blob survives `NvsAdapter` save/load unchanged
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use plugbridge::adapters::nvs::NvsAdapter;
use plugbridge::app::ports::ConfigPort;
use plugbridge::config::BridgeConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = BridgeConfig::from_json(data) {
        assert!(cfg.validate().is_ok(), "from_json returned an invalid config");
    }

    let Ok(cfg) = postcard::from_bytes::<BridgeConfig>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }

    let nvs = NvsAdapter::new().expect("simulation backend never fails");
    nvs.save(&cfg).expect("valid config must persist");
    assert_eq!(nvs.load().expect("saved config must load"), cfg);
});
