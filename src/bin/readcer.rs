//! Checks the extensions of a certificate against its issuer.
//!
//! Usage: `readcer <cert> [<issuer>]`
//!
//! Without an issuer, the Authority Key Identifier can’t be verified and
//! is skipped.

use std::env;
use std::process::exit;
use rpki_trust::cert::Cert;
use rpki_trust::config::Config;
use rpki_trust::crypto::DigestAlgorithm;
use rpki_trust::extension::{self, ExtensionHandlers, handle_aki};
use rpki_trust::util::hex::Hex;
use rpki_trust::validation::Validation;


fn main() {
    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: readcer <cert> [<issuer>]");
            exit(2)
        }
    };
    let issuer = args.next();

    let config = Config::default();
    let mut validation = Validation::new(config);
    if let Some(issuer) = issuer {
        match Cert::load(&issuer, config.decode_options()) {
            Ok(cert) => validation.push_cert(cert),
            Err(err) => {
                eprintln!("Can’t load issuer: {}", err);
                exit(1)
            }
        }
    }

    let cert = match Cert::load(&path, config.decode_options()) {
        Ok(cert) => cert,
        Err(err) => {
            eprintln!("Can’t load cert: {}", err);
            exit(1)
        }
    };

    println!(
        "Key identifier: {}",
        Hex(
            cert.subject_public_key_info()
                .key_identifier(DigestAlgorithm::Sha1).as_ref()
        )
    );
    for ext in cert.extensions() {
        let name = match ext.metadata() {
            Some(meta) => meta.name().to_string(),
            None => ext.oid().to_string(),
        };
        println!(
            "Extension: {}{}", name,
            if ext.is_critical() { " (critical)" } else { "" }
        );
    }

    let validation = &validation;
    let check_aki = validation.depth() > 0;
    let mut handlers = ExtensionHandlers::new()
        .with(&extension::BC, false, |_| Ok(()))
        .with(&extension::SKI, true, |_| Ok(()))
        .with(&extension::KU, true, |_| Ok(()))
        .with(&extension::CDP, false, |_| Ok(()))
        .with(&extension::AIA, false, |_| Ok(()))
        .with(&extension::SIA, false, |_| Ok(()))
        .with(&extension::CP, false, |_| Ok(()))
        .with(&extension::IR, false, |_| Ok(()))
        .with(&extension::AR, false, |_| Ok(()));
    if check_aki {
        handlers.push(&extension::AKI, true, |ext| {
            handle_aki(ext, Some(validation))
        });
    }
    else {
        handlers.push(&extension::AKI, false, |_| Ok(()));
    }

    match handlers.handle(cert.extensions()) {
        Ok(()) => {
            if check_aki {
                println!("Extensions valid, issued by the given issuer.");
            }
            else {
                println!("Extensions valid, issuer not checked.");
            }
        }
        Err(err) => {
            eprintln!("Invalid extensions: {}", err);
            exit(1)
        }
    }
}
