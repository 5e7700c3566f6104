use crate::opts::EditOpts;
use crate::util;

use sealbox_core::api::KeyService;

pub async fn exec(edit_opts: EditOpts) {
    let EditOpts {
        id,
        text,
        principal,
        authority,
        seed_file,
    } = edit_opts;

    let owner = util::parse_principal(&principal);
    let mut session = util::ready_session(&authority, &seed_file).await;

    let ciphertext = util::seal_note(&mut session, &owner, &text).await;

    session
        .service()
        .edit_note(id, ciphertext, owner)
        .await
        .unwrap_or_else(|e| util::fail(e));

    eprintln!("Replaced note {id}");
}
