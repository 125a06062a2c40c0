#![no_main]

use libfuzzer_sys::fuzz_target;
use rpki_trust::asn1::{decode, DecodeOptions};
use rpki_trust::cert::Cert;
use rpki_trust::crypto::PublicKey;
use rpki_trust::extension::{AuthorityKeyIdentifier, Extension, Extensions};

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };
    let options = if which & 0x80 == 0 {
        DecodeOptions::der().quiet()
    }
    else {
        DecodeOptions::ber().quiet()
    };

    match which % 5 {
        0 => { let _ = decode::<Cert>(data, options); },
        1 => { let _ = decode::<Extensions>(data, options); },
        2 => { let _ = decode::<Extension>(data, options); },
        3 => { let _ = decode::<AuthorityKeyIdentifier>(data, options); },
        4 => { let _ = decode::<PublicKey>(data, options); },
        _ => panic!("what?"),
    }
});
