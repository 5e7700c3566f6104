use crate::opts::ReadOpts;
use crate::util;

use sealbox_core::api::KeyService;

pub async fn exec(read_opts: ReadOpts) {
    let ReadOpts {
        id,
        principal,
        authority,
        seed_file,
    } = read_opts;

    let owner = util::parse_principal(&principal);
    let mut session = util::ready_session(&authority, &seed_file).await;

    let notes = session
        .service()
        .list_notes(owner.clone())
        .await
        .unwrap_or_else(|e| util::fail(e));

    let note = notes
        .into_iter()
        .find(|note| note.id == id)
        .unwrap_or_else(|| util::fail(format!("no note with id {id}")));

    let plaintext = util::open_note(&mut session, &owner, &note.ciphertext).await;

    println!("{}", String::from_utf8_lossy(&plaintext));
}
