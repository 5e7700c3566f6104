use clap::{Parser, ValueHint};

/// Command line interface for Sealbox, an encrypted note sharing service.
#[derive(Parser, Debug)]
#[clap(name = "sealbox-cli", version = "0.2", author = "Sealbox developers")]
pub struct Opts {
    #[clap(subcommand)]
    pub subcmd: Subcommand,
}

#[derive(Parser, Debug)]
pub enum Subcommand {
    Save(SaveOpts),
    List(ListOpts),
    Read(ReadOpts),
    Edit(EditOpts),
    Share(ShareOpts),
    Redeem(RedeemOpts),
    Totp(TotpOpts),
}

/// Save an encrypted note.
#[derive(Parser, Debug)]
#[clap(name = "Save")]
pub struct SaveOpts {
    /// The note text.
    #[clap(index = 1)]
    pub text: String,

    /// Principal to save the note under; omit for an anonymous note.
    #[clap(short, long)]
    pub principal: Option<String>,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,

    /// File holding the hex-encoded session seed; created when missing.
    #[clap(short, long, default_value = "sealbox.seed")]
    pub seed_file: String,
}

/// List stored notes.
#[derive(Parser, Debug)]
#[clap(name = "List")]
pub struct ListOpts {
    /// Principal whose notes to list; omit for anonymous notes.
    #[clap(short, long)]
    pub principal: Option<String>,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,
}

/// Decrypt and print one note.
#[derive(Parser, Debug)]
#[clap(name = "Read")]
pub struct ReadOpts {
    /// The note id.
    #[clap(index = 1)]
    pub id: u64,

    /// Principal the note was saved under; omit for an anonymous note.
    #[clap(short, long)]
    pub principal: Option<String>,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,

    /// File holding the hex-encoded session seed; created when missing.
    #[clap(short, long, default_value = "sealbox.seed")]
    pub seed_file: String,
}

/// Replace the contents of a note.
#[derive(Parser, Debug)]
#[clap(name = "Edit")]
pub struct EditOpts {
    /// The note id.
    #[clap(index = 1)]
    pub id: u64,

    /// The new note text.
    #[clap(index = 2)]
    pub text: String,

    /// Principal the note was saved under; omit for an anonymous note.
    #[clap(short, long)]
    pub principal: Option<String>,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,

    /// File holding the hex-encoded session seed; created when missing.
    #[clap(short, long, default_value = "sealbox.seed")]
    pub seed_file: String,
}

/// Store a note and mint a one-time link for it.
#[derive(Parser, Debug)]
#[clap(name = "Share")]
pub struct ShareOpts {
    /// The note text.
    #[clap(index = 1)]
    pub text: String,

    /// Principal to record as the note owner; omit for an anonymous note.
    #[clap(short, long)]
    pub principal: Option<String>,

    /// Base URL the share link points at.
    #[clap(short, long, default_value = "https://notes.example/share", value_hint = ValueHint::Url)]
    pub base_url: String,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,

    /// File holding the hex-encoded session seed; created when missing.
    #[clap(short, long, default_value = "sealbox.seed")]
    pub seed_file: String,
}

/// Redeem a one-time link. This consumes the link.
#[derive(Parser, Debug)]
#[clap(name = "Redeem")]
pub struct RedeemOpts {
    /// The share link.
    #[clap(index = 1, conflicts_with_all = &["id", "signature"])]
    pub link: Option<String>,

    /// The note id, as an alternative to a full link.
    #[clap(short, long, requires = "signature")]
    pub id: Option<u64>,

    /// The hex signature, as an alternative to a full link.
    #[clap(long, requires = "id")]
    pub signature: Option<String>,

    /// Skip the confirmation prompt.
    #[clap(short, long)]
    pub yes: bool,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,
}

/// Print signed authenticator codes for this session.
#[derive(Parser, Debug)]
#[clap(name = "Totp")]
pub struct TotpOpts {
    /// Keep printing a fresh code every interval.
    #[clap(short, long)]
    pub watch: bool,

    /// Key authority URL.
    #[clap(short, long, default_value = "http://localhost:8087", value_hint = ValueHint::Url)]
    pub authority: String,

    /// File holding the hex-encoded session seed; created when missing.
    #[clap(short, long, default_value = "sealbox.seed")]
    pub seed_file: String,
}
