use crate::client::HttpAuthority;
use crate::opts::ListOpts;
use crate::util;

use sealbox_core::api::KeyService;

pub async fn exec(list_opts: ListOpts) {
    let ListOpts {
        principal,
        authority,
    } = list_opts;

    let owner = util::parse_principal(&principal);

    // Listing returns ciphertexts only, so no session is needed.
    let service = HttpAuthority::new(&authority).unwrap_or_else(|e| util::fail(e));

    let notes = service
        .list_notes(owner)
        .await
        .unwrap_or_else(|e| util::fail(e));

    if notes.is_empty() {
        eprintln!("No notes found");
        return;
    }

    for note in notes {
        println!(
            "{}\t{}\t{} bytes",
            note.id,
            note.created_at,
            note.ciphertext.len()
        );
    }
}
