use crate::opts::ShareOpts;
use crate::util;

use rand::RngCore;
use sealbox_core::api::KeyService;
use sealbox_core::capability;
use sealbox_core::ibe::IbeCiphertext;
use sealbox_core::identity::Principal;
use sealbox_core::SEED_SIZE;

pub async fn exec(share_opts: ShareOpts) {
    let ShareOpts {
        text,
        principal,
        base_url,
        authority,
        seed_file,
    } = share_opts;

    let mut rng = rand::thread_rng();

    let owner = util::parse_principal(&principal);
    let session = util::ready_session(&authority, &seed_file).await;

    // A shared note is always encrypted to the anonymous identity, whatever
    // its owner: the redeemer unwraps the anonymous key, not the owner's.
    let context = Principal::anonymous().derivation_context();
    let mut seed = [0u8; SEED_SIZE];
    rng.fill_bytes(&mut seed);

    let params = session
        .ibe_public_parameters()
        .unwrap_or_else(|e| util::fail(e));
    let ciphertext = IbeCiphertext::encrypt(params, context.as_ref(), text.as_bytes(), &seed)
        .unwrap_or_else(|e| util::fail(e))
        .to_bytes();

    let id = session
        .service()
        .save_note(ciphertext, owner)
        .await
        .unwrap_or_else(|e| util::fail(e));

    let minted = capability::mint(session.service(), &mut rng, id)
        .await
        .unwrap_or_else(|e| util::fail(e));

    let link = minted.share_link(&base_url);

    eprintln!("Saved note {id} and minted a capability for it.");
    println!("{link}");
    util::print_qr(&link);

    eprintln!("The link can be redeemed exactly once.");
}
