use crate::opts::TotpOpts;
use crate::util;

use sealbox_core::otp;
use sealbox_core::CODE_REFRESH_SECS;
use std::time::Duration;

pub async fn exec(totp_opts: TotpOpts) {
    let TotpOpts {
        watch,
        authority,
        seed_file,
    } = totp_opts;

    let mut rng = rand::thread_rng();

    let session = util::ready_session(&authority, &seed_file).await;
    let public_key = session.public_key().unwrap_or_else(|e| util::fail(e));

    eprintln!("Verification key: {}", hex::encode(public_key.to_bytes()));

    loop {
        let keypair = session.keypair().unwrap_or_else(|e| util::fail(e));
        let signed = otp::generate(keypair, &mut rng);

        println!(
            "{}  sig {}",
            signed.code(),
            &signed.signature().to_hex()[..16]
        );

        if !watch {
            break;
        }

        tokio::time::sleep(Duration::from_secs(CODE_REFRESH_SECS)).await;
    }
}
