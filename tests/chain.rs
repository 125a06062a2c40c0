//! Validating a certificate against its issuer through the public API.

use std::fs;
use rpki_trust::ErrorKind;
use rpki_trust::asn1::DecodeOptions;
use rpki_trust::cert::Cert;
use rpki_trust::config::Config;
use rpki_trust::crypto::DigestAlgorithm;
use rpki_trust::extension::{self, ExtensionHandlers, handle_aki};
use rpki_trust::validation::Validation;

const ISSUER_KEY: &[u8] = b"\x30\x06\x02\x01\x0b\x02\x01\x03";
const SUBJECT_KEY: &[u8] = b"\x30\x06\x02\x01\x0d\x02\x01\x03";

fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    assert!(content.len() < 0x100);
    let mut res = vec![tag];
    if content.len() >= 0x80 {
        res.push(0x81);
    }
    res.push(content.len() as u8);
    res.extend_from_slice(content);
    res
}

fn seq(items: &[Vec<u8>]) -> Vec<u8> {
    tlv(0x30, &items.concat())
}

fn ext(oid: &[u8], critical: bool, value: &[u8]) -> Vec<u8> {
    let mut items = vec![tlv(0x06, oid)];
    if critical {
        items.push(b"\x01\x01\xff".to_vec());
    }
    items.push(tlv(0x04, value));
    seq(&items)
}

fn cert(key: &[u8], extensions: &[Vec<u8>]) -> Vec<u8> {
    let name = b"\x30\x0f\x31\x0d\x30\x0b\x06\x03\x55\x04\x03\x0c\x04Test";
    let sig_alg = b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\
                    \x05\x00";
    let key_info = seq(&[
        seq(&[
            b"\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01".to_vec(),
            b"\x05\x00".to_vec(),
        ]),
        tlv(0x03, &[b"\x00".as_ref(), key].concat()),
    ]);
    let mut tbs = vec![
        b"\xa0\x03\x02\x01\x02".to_vec(),
        b"\x02\x01\x2a".to_vec(),
        sig_alg.to_vec(),
        name.to_vec(),
        b"\x30\x1e\x17\x0d240101000000Z\x17\x0d340101000000Z".to_vec(),
        name.to_vec(),
        key_info,
    ];
    if !extensions.is_empty() {
        tbs.push(tlv(0xa3, &seq(extensions)));
    }
    let tbs = seq(&tbs);
    let mut res = vec![0x30, 0x81, (tbs.len() + 21) as u8];
    res.extend_from_slice(&tbs);
    res.extend_from_slice(sig_alg);
    res.extend_from_slice(b"\x03\x04\x00\x01\x02\x03");
    res
}

fn child(aki_key: &[u8], extra: Option<Vec<u8>>) -> Cert {
    let key_id = DigestAlgorithm::Sha1.digest(aki_key);
    let mut extensions = vec![
        ext(extension::KU.oid().0, true, b"\x03\x02\x07\x80"),
        ext(
            extension::SKI.oid().0, false,
            &tlv(0x04, DigestAlgorithm::Sha1.digest(SUBJECT_KEY).as_ref())
        ),
        ext(
            extension::AKI.oid().0, false,
            &seq(&[tlv(0x80, key_id.as_ref())])
        ),
    ];
    extensions.extend(extra);
    Cert::decode(
        &cert(SUBJECT_KEY, &extensions), DecodeOptions::der()
    ).unwrap()
}

fn validation() -> Validation {
    let path = std::env::temp_dir().join(
        format!("rpki-trust-issuer-{}.cer", std::process::id())
    );
    fs::write(&path, cert(ISSUER_KEY, &[])).unwrap();
    let issuer = Cert::load(&path, DecodeOptions::der()).unwrap();
    fs::remove_file(&path).unwrap();

    let mut res = Validation::new(Config::default());
    res.push_cert(issuer);
    res
}

fn dispatch(cert: &Cert, validation: &Validation) -> Result<usize, ErrorKind> {
    let mut key_usage = 0;
    let res = ExtensionHandlers::new()
        .with(&extension::KU, true, |_| { key_usage += 1; Ok(()) })
        .with(&extension::SKI, true, |_| Ok(()))
        .with(&extension::AKI, true, |ext| handle_aki(ext, Some(validation)))
        .handle(cert.extensions());
    res.map(|_| key_usage).map_err(|err| err.kind())
}

#[test]
fn issued_by_parent() {
    let validation = validation();
    assert_eq!(dispatch(&child(ISSUER_KEY, None), &validation), Ok(1));
}

#[test]
fn issued_by_someone_else() {
    let validation = validation();
    assert_eq!(
        dispatch(&child(SUBJECT_KEY, None), &validation),
        Err(ErrorKind::KeyIdentifierMismatch)
    );
}

#[test]
fn unknown_critical_extension() {
    let validation = validation();
    let cert = child(
        ISSUER_KEY, Some(ext(extension::IR.oid().0, true, b"\x30\x00"))
    );
    assert_eq!(
        dispatch(&cert, &validation),
        Err(ErrorKind::UnknownCriticalExtension)
    );

    // Unknown but not critical is fine.
    let cert = child(
        ISSUER_KEY, Some(ext(extension::CDP.oid().0, false, b"\x30\x00"))
    );
    assert_eq!(dispatch(&cert, &validation), Ok(1));
}

#[test]
fn no_issuer() {
    let validation = Validation::new(Config::default());
    assert_eq!(
        dispatch(&child(ISSUER_KEY, None), &validation),
        Err(ErrorKind::NoParentCertificate)
    );
}
