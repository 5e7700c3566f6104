use sealbox_core::api::{KeyService, NoteId, NoteRecord, Parameters};
use sealbox_core::artifacts::{
    deserialize_vec_or_b64, serialize_vec_or_b64, DerivedPublicKey, EncryptedKey, Signature,
    TransportPublicKey,
};
use sealbox_core::error::{CapabilityError, Error};
use sealbox_core::identity::{DerivationContext, Principal};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{ClientBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};

use lazy_static::lazy_static;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

lazy_static! {
    static ref HEADER_VAL: String = format!("cli,{PKG_VERSION}");
    static ref HEADERS: HeaderMap = {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Sealbox-Client-Version",
            HeaderValue::from_static(&HEADER_VAL),
        );
        headers
    };
}

fn remote(e: reqwest::Error) -> Error {
    Error::RemoteCall(e.to_string())
}

/// A key authority reached over HTTP.
pub struct HttpAuthority {
    baseurl: String,
    client: reqwest::Client,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct KeyRequest<'a> {
    transport_key: &'a TransportPublicKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a DerivationContext>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NoteRequest {
    #[serde(serialize_with = "serialize_vec_or_b64")]
    ciphertext: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<Principal>,
}

#[derive(Deserialize, Debug)]
struct SaveResponse {
    id: NoteId,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    id: NoteId,
    verification_key: TransportPublicKey,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RedeemRequest<'a> {
    signature: &'a Signature,
    redeemer_key: &'a TransportPublicKey,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RedeemResponse {
    #[serde(deserialize_with = "deserialize_vec_or_b64")]
    ciphertext: Vec<u8>,
    encrypted_key: EncryptedKey,
}

impl HttpAuthority {
    pub fn new(baseurl: &str) -> Result<Self, Error> {
        let client = ClientBuilder::new().build().map_err(remote)?;

        Ok(Self {
            baseurl: baseurl.to_string(),
            client,
        })
    }

    fn create_url(&self, u: &str) -> Url {
        Url::parse(&self.baseurl).unwrap().join(u).unwrap()
    }

    // The capability endpoints encode their protocol outcomes as statuses.
    fn capability_status(status: StatusCode) -> Option<Error> {
        match status {
            StatusCode::NOT_FOUND => Some(CapabilityError::NotFound.into()),
            StatusCode::CONFLICT => Some(CapabilityError::AlreadyRedeemed.into()),
            StatusCode::GONE => Some(CapabilityError::Expired.into()),
            _ => None,
        }
    }
}

#[async_trait]
impl KeyService for HttpAuthority {
    async fn identity_public_parameters(&self) -> Result<Parameters<DerivedPublicKey>, Error> {
        let res = self
            .client
            .get(self.create_url("v1/parameters/identity"))
            .headers(HEADERS.clone())
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?
            .json::<Parameters<DerivedPublicKey>>()
            .await
            .map_err(remote)?;

        log::debug!("fetched identity parameters from {}", self.baseurl);

        Ok(res)
    }

    async fn symmetric_verification_key(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Parameters<DerivedPublicKey>, Error> {
        let mut url = self.create_url("v1/parameters/verification");
        if let Some(principal) = principal {
            url.query_pairs_mut()
                .append_pair("principal", &hex::encode(principal.as_bytes()));
        }

        let res = self
            .client
            .get(url)
            .headers(HEADERS.clone())
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?
            .json::<Parameters<DerivedPublicKey>>()
            .await
            .map_err(remote)?;

        Ok(res)
    }

    async fn encrypted_symmetric_key(
        &self,
        transport_key: &TransportPublicKey,
    ) -> Result<EncryptedKey, Error> {
        let res = self
            .client
            .post(self.create_url("v1/keys/symmetric"))
            .headers(HEADERS.clone())
            .json(&KeyRequest {
                transport_key,
                context: None,
            })
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?
            .json::<EncryptedKey>()
            .await
            .map_err(remote)?;

        Ok(res)
    }

    async fn encrypted_identity_key(
        &self,
        transport_key: &TransportPublicKey,
        context: &DerivationContext,
    ) -> Result<EncryptedKey, Error> {
        let res = self
            .client
            .post(self.create_url("v1/keys/identity"))
            .headers(HEADERS.clone())
            .json(&KeyRequest {
                transport_key,
                context: Some(context),
            })
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?
            .json::<EncryptedKey>()
            .await
            .map_err(remote)?;

        Ok(res)
    }

    async fn save_note(
        &self,
        ciphertext: Vec<u8>,
        owner: Option<Principal>,
    ) -> Result<NoteId, Error> {
        let res = self
            .client
            .post(self.create_url("v1/notes"))
            .headers(HEADERS.clone())
            .json(&NoteRequest { ciphertext, owner })
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?
            .json::<SaveResponse>()
            .await
            .map_err(remote)?;

        Ok(res.id)
    }

    async fn list_notes(&self, owner: Option<Principal>) -> Result<Vec<NoteRecord>, Error> {
        let mut url = self.create_url("v1/notes");
        if let Some(owner) = &owner {
            url.query_pairs_mut()
                .append_pair("owner", &hex::encode(owner.as_bytes()));
        }

        let res = self
            .client
            .get(url)
            .headers(HEADERS.clone())
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?
            .json::<Vec<NoteRecord>>()
            .await
            .map_err(remote)?;

        Ok(res)
    }

    async fn edit_note(
        &self,
        id: NoteId,
        ciphertext: Vec<u8>,
        owner: Option<Principal>,
    ) -> Result<(), Error> {
        self.client
            .put(self.create_url(&format!("v1/notes/{id}")))
            .headers(HEADERS.clone())
            .json(&NoteRequest { ciphertext, owner })
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?;

        Ok(())
    }

    async fn register_capability(
        &self,
        id: NoteId,
        verification_key: TransportPublicKey,
    ) -> Result<(), Error> {
        self.client
            .post(self.create_url("v1/capabilities"))
            .headers(HEADERS.clone())
            .json(&RegisterRequest {
                id,
                verification_key,
            })
            .send()
            .await
            .map_err(remote)?
            .error_for_status()
            .map_err(remote)?;

        Ok(())
    }

    async fn capability_key(&self, id: NoteId) -> Result<TransportPublicKey, Error> {
        let res = self
            .client
            .get(self.create_url(&format!("v1/capabilities/{id}")))
            .headers(HEADERS.clone())
            .send()
            .await
            .map_err(remote)?;

        if let Some(e) = Self::capability_status(res.status()) {
            return Err(e);
        }

        let res = res
            .error_for_status()
            .map_err(remote)?
            .json::<TransportPublicKey>()
            .await
            .map_err(remote)?;

        Ok(res)
    }

    async fn redeem_capability(
        &self,
        id: NoteId,
        signature: &Signature,
        redeemer_key: &TransportPublicKey,
    ) -> Result<(Vec<u8>, EncryptedKey), Error> {
        let res = self
            .client
            .post(self.create_url(&format!("v1/capabilities/{id}/redeem")))
            .headers(HEADERS.clone())
            .json(&RedeemRequest {
                signature,
                redeemer_key,
            })
            .send()
            .await
            .map_err(remote)?;

        if let Some(e) = Self::capability_status(res.status()) {
            return Err(e);
        }

        let res = res
            .error_for_status()
            .map_err(remote)?
            .json::<RedeemResponse>()
            .await
            .map_err(remote)?;

        Ok((res.ciphertext, res.encrypted_key))
    }
}
