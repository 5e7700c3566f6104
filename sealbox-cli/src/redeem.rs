use crate::client::HttpAuthority;
use crate::opts::RedeemOpts;
use crate::util;

use inquire::Confirm;
use sealbox_core::capability;

pub async fn exec(redeem_opts: RedeemOpts) {
    let RedeemOpts {
        link,
        id,
        signature,
        yes,
        authority,
    } = redeem_opts;

    let (id, signature_hex) = match (link, id, signature) {
        (Some(link), _, _) => capability::parse_link(&link).unwrap_or_else(|e| util::fail(e)),
        (None, Some(id), Some(signature)) => (id, signature),
        _ => util::fail("pass a share link or both --id and --signature"),
    };

    if !yes {
        let proceed = Confirm::new("A one-time link is consumed by redeeming it. Continue?")
            .with_default(true)
            .prompt()
            .unwrap_or(false);

        if !proceed {
            eprintln!("Aborted");
            return;
        }
    }

    let mut rng = rand::thread_rng();
    let service = HttpAuthority::new(&authority).unwrap_or_else(|e| util::fail(e));

    let plaintext = capability::redeem(&service, &mut rng, id, &signature_hex)
        .await
        .unwrap_or_else(|e| util::fail(e));

    println!("{}", String::from_utf8_lossy(&plaintext));
}
