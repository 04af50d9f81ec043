//! Test material: a one-user hierarchy and well-formed proposals and
//! transactions built straight from the credential primitives.

use rand::rngs::OsRng;
use shared_crypto::{
    auditing_encrypt, generate_nym_keys, produce_attribute, schnorr, sha3_256, sign_non_revoke,
    sign_nym, AuditingProof, Credentials, Index, KeyPair, NymKeys, PublicParams, RevocationProof,
};
use shared_types::{
    canonical_bytes, AuditData, Endorsement, PeerId, Transaction, TransactionProposal, AUDITOR,
    CHAINCODE, REVOCATION_AUTHORITY,
};

use super::checks::TrustAnchors;

pub const SEED: u64 = 7;

pub struct Fixture {
    pub params: PublicParams,
    pub user: KeyPair,
    pub credentials: Credentials,
    pub auditor: KeyPair,
    pub revocation: KeyPair,
}

impl Fixture {
    pub fn new() -> Self {
        let (params, root) = PublicParams::from_seed(SEED);
        let org = KeyPair::derive(SEED, "org", 0, 1);
        let user = KeyPair::derive(SEED, "user", 0, 2);
        let mut credentials = Credentials::new(root.pk);
        credentials
            .delegate(
                &mut OsRng,
                &root.sk,
                org.pk,
                vec![produce_attribute(1, "org-0"), produce_attribute(1, "has-right-to-post")],
            )
            .unwrap();
        credentials
            .delegate(
                &mut OsRng,
                &org.sk,
                user.pk,
                vec![produce_attribute(2, "user-0"), produce_attribute(2, "has-right-to-post")],
            )
            .unwrap();

        Self {
            params,
            user,
            credentials,
            auditor: KeyPair::derive(SEED, AUDITOR, 0, 0),
            revocation: KeyPair::derive(SEED, REVOCATION_AUTHORITY, 0, 0),
        }
    }

    pub fn anchors(&self) -> TrustAnchors {
        TrustAnchors {
            params: self.params.clone(),
            auditor_pk: self.auditor.pk,
            revocation_pk: self.revocation.pk,
        }
    }

    pub fn proposal(&self, message: &str) -> (TransactionProposal, NymKeys) {
        let nym = generate_nym_keys(&mut OsRng, &self.user.sk, &self.params);
        let indices = vec![Index {
            link: 1,
            position: 1,
            attribute: produce_attribute(2, "has-right-to-post"),
        }];
        let proof = self
            .credentials
            .prove(&mut OsRng, &self.user.sk, &nym, &indices, &self.params)
            .unwrap()
            .to_bytes();
        let hash = sha3_256(message.as_bytes());
        let signature = sign_nym(
            &mut OsRng,
            &nym,
            &self.user.sk,
            &self.params,
            &canonical_bytes(&hash, CHAINCODE, 0, &proof),
        );
        let proposal = TransactionProposal {
            hash,
            author_id: 0,
            chaincode: CHAINCODE.to_string(),
            proof,
            nym_pk: nym.pk,
            indices,
            signature,
        };
        (proposal, nym)
    }

    pub fn endorse(&self, peer: &KeyPair, id: PeerId, proposal: &TransactionProposal) -> Endorsement {
        Endorsement {
            signature: schnorr::sign(&mut OsRng, &peer.sk, &proposal.canonical_bytes()),
            endorser: id,
        }
    }

    pub fn transaction(
        &self,
        proposal: TransactionProposal,
        nym: &NymKeys,
        endorsements: Vec<Endorsement>,
        epoch: u64,
    ) -> Transaction {
        let signature = sign_nym(
            &mut OsRng,
            nym,
            &self.user.sk,
            &self.params,
            &proposal.canonical_bytes(),
        );
        let (encryption, randomness) = auditing_encrypt(&mut OsRng, &self.auditor.pk, &self.user.pk);
        let audit_proof = AuditingProof::prove(
            &mut OsRng,
            &encryption,
            &randomness,
            &self.user.sk,
            nym,
            &self.auditor.pk,
            &self.params,
        );
        let handle = sign_non_revoke(&mut OsRng, &self.revocation.sk, &self.user.pk, epoch);
        let non_revocation =
            RevocationProof::prove(&mut OsRng, &handle, &self.user.sk, nym, epoch, &self.params);

        Transaction {
            signature,
            proposal,
            audit: Some(AuditData {
                encryption,
                proof: audit_proof,
            }),
            endorsements,
            non_revocation: Some(non_revocation),
            epoch,
            orderer: None,
        }
    }
}
