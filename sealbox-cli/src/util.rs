use crate::client::HttpAuthority;
use sealbox_core::aead;
use sealbox_core::ibe::IbeCiphertext;
use sealbox_core::identity::Principal;
use sealbox_core::session::Session;
use sealbox_core::SEED_SIZE;

use qrcode::render::Pixel;
use qrcode::Color;
use rand::RngCore;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub(crate) fn fail(e: impl Display) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1)
}

// Renders the link inverted, which scans better on dark terminals.
pub(crate) fn print_qr(data: &str) {
    let code = qrcode::QrCode::new(data).unwrap();
    let scode = code
        .render::<char>()
        .quiet_zone(true)
        .module_dimensions(2, 1)
        .light_color(Pixel::default_color(Color::Dark))
        .dark_color(Pixel::default_color(Color::Light))
        .build();

    eprintln!("\n\n{}", scode);
}

/// Reads the session seed from `path`, creating it on first use.
pub(crate) fn load_or_create_seed(path: &str) -> [u8; SEED_SIZE] {
    if Path::new(path).exists() {
        let hex_str = fs::read_to_string(path).unwrap_or_else(|e| fail(e));
        let raw = hex::decode(hex_str.trim())
            .unwrap_or_else(|_| fail(format!("{path} does not hold a hex seed")));

        raw.try_into()
            .unwrap_or_else(|_| fail(format!("{path} does not hold a 32-byte seed")))
    } else {
        let mut seed = [0u8; SEED_SIZE];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut seed);

        fs::write(path, hex::encode(seed)).unwrap_or_else(|e| fail(e));
        log::info!("wrote a fresh session seed to {path}");

        seed
    }
}

pub(crate) fn parse_principal(principal: &Option<String>) -> Option<Principal> {
    principal
        .as_ref()
        .map(|p| Principal::from_bytes(p.as_bytes()).unwrap_or_else(|e| fail(e)))
}

/// Builds a `Ready` session against `authority` from the persisted seed.
pub(crate) async fn ready_session(authority: &str, seed_file: &str) -> Session<HttpAuthority> {
    let mut rng = rand::thread_rng();

    let seed = load_or_create_seed(seed_file);
    let service = HttpAuthority::new(authority).unwrap_or_else(|e| fail(e));

    let mut session = Session::new(service);
    session
        .initialize(Some(&seed), &mut rng)
        .await
        .unwrap_or_else(|e| fail(e));

    session
}

/// Seals `text` the way the owner mode dictates: under the principal's
/// symmetric key when one is given, to the anonymous identity otherwise.
pub(crate) async fn seal_note(
    session: &mut Session<HttpAuthority>,
    owner: &Option<Principal>,
    text: &str,
) -> Vec<u8> {
    let mut rng = rand::thread_rng();

    match owner {
        Some(principal) => {
            session.login(principal).await.unwrap_or_else(|e| fail(e));

            let key = session.symmetric_key().unwrap_or_else(|e| fail(e));
            aead::encrypt(key, text.as_bytes(), &mut rng).unwrap_or_else(|e| fail(e))
        }
        None => {
            let context = Principal::anonymous().derivation_context();
            let mut seed = [0u8; SEED_SIZE];
            rng.fill_bytes(&mut seed);

            let params = session.ibe_public_parameters().unwrap_or_else(|e| fail(e));
            IbeCiphertext::encrypt(params, context.as_ref(), text.as_bytes(), &seed)
                .unwrap_or_else(|e| fail(e))
                .to_bytes()
        }
    }
}

/// Opens a note ciphertext saved by [`seal_note`].
pub(crate) async fn open_note(
    session: &mut Session<HttpAuthority>,
    owner: &Option<Principal>,
    ciphertext: &[u8],
) -> Vec<u8> {
    match owner {
        Some(principal) => {
            session.login(principal).await.unwrap_or_else(|e| fail(e));

            let key = session.symmetric_key().unwrap_or_else(|e| fail(e));
            aead::decrypt(key, ciphertext).unwrap_or_else(|e| fail(e))
        }
        None => {
            let context = Principal::anonymous().derivation_context();
            let key = session
                .identity_decryption_key(&context)
                .await
                .unwrap_or_else(|e| fail(e));

            IbeCiphertext::from_bytes(ciphertext)
                .and_then(|ct| ct.decrypt(&key))
                .unwrap_or_else(|e| fail(e))
        }
    }
}
