use crate::opts::SaveOpts;
use crate::util;

use sealbox_core::api::KeyService;

pub async fn exec(save_opts: SaveOpts) {
    let SaveOpts {
        text,
        principal,
        authority,
        seed_file,
    } = save_opts;

    let owner = util::parse_principal(&principal);
    let mut session = util::ready_session(&authority, &seed_file).await;

    let ciphertext = util::seal_note(&mut session, &owner, &text).await;

    let id = session
        .service()
        .save_note(ciphertext, owner)
        .await
        .unwrap_or_else(|e| util::fail(e));

    eprintln!("Saved note {id}");
}
