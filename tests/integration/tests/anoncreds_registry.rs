//! Integration test: an issuer with a registered DID publishes AnonCreds
//! objects and a verifier resolves them through its own registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use hiero_anoncreds::{
    AccumKey, AnonCredsCredDef, AnonCredsRevList, AnonCredsRevRegDef, AnonCredsSchema,
    CredDefValue, CredDefValuePrimary, HederaAnonCredsRegistry, RevRegDefPublicKeys,
    RevRegDefValue,
};
use hiero_core::ErrorKind;
use hiero_did::{HederaNetwork, StaticDocumentFetcher};
use hiero_integration_tests::{feed, load_config, registered_did, registered_did_with_config};

fn rev_list(issuer_id: &str, rev_reg_id: &str, bits: &[u8], accum: &str) -> AnonCredsRevList {
    AnonCredsRevList {
        issuer_id: issuer_id.into(),
        rev_reg_def_id: rev_reg_id.into(),
        revocation_list: bits.to_vec(),
        current_accumulator: accum.into(),
        timestamp: None,
    }
}

#[tokio::test]
async fn test_issuer_publishes_and_verifier_resolves() -> anyhow::Result<()> {
    let config = load_config(
        r#"
[network]
name = "previewnet"

[hcs]
max_chunk_size = 256

[cache]
rev_reg_entries_ttl_secs = 300
"#,
    )?;
    let feed = feed();
    let (did, key) =
        registered_did_with_config(&feed, Arc::new(StaticDocumentFetcher::new()), &config).await?;
    let issuer_id = did.identifier().expect("registered").to_string();
    assert_eq!(did.identifier().expect("registered").network(), HederaNetwork::Previewnet);

    let issuer = HederaAnonCredsRegistry::from_config(feed.clone(), &config);

    let schema = AnonCredsSchema {
        issuer_id: issuer_id.clone(),
        name: "university-degree".into(),
        version: "2.1".into(),
        attr_names: vec!["name".into(), "degree".into(), "graduated".into()],
    };
    let schema_result = issuer.register_schema(schema.clone(), &key).await;
    assert!(schema_result.is_finished(), "{:?}", schema_result.reason);
    let schema_id = schema_result.id.expect("schema id");

    let cred_def = AnonCredsCredDef::new(
        issuer_id.clone(),
        schema_id.clone(),
        "degree-v1",
        CredDefValue {
            primary: CredDefValuePrimary {
                n: "94752773003676215520340390286428145970577435379747248974837494389412082076547661891067434652276048522392442077335235388384984508621151996372559370276527598415204914831299768834758349425880859567795461321350412568232531440683627330032285846734752711268206613305069973750567165548816744023441650243801226580089078611213688037852063937259593837571943085718154394160122127891902723469618952030300431400181642597638732611518885616750614674142486169255034160093153314427704384760404032620300207070597238445621198019686315730573836193179483581719638565112589368474184957790046080767607443902003396643479910885086397579016949".into(),
                s: "69412039600361800795429063472749802282903100455399422661844374992112119187258494682747330126416608111152308407310993289705267392969490079422545377823004584691698371089275086755756916575365439635768831063415050875440259347714303092581127338698890829662982679857654396534761554232914231213603075653629534596880597317047082696083166437821687405393805812336036647064899914817619861844092002636340952247588092904075021313598848481976631171767602864723880294787434756140969093416957086578979859382777377267118038126527549503876861370823520292585383483415337137062969402135540724590433024573312636828352734474276871187481042".into(),
                r: BTreeMap::from([
                    ("degree".to_string(), "1".to_string()),
                    ("graduated".to_string(), "2".to_string()),
                    ("master_secret".to_string(), "3".to_string()),
                    ("name".to_string(), "4".to_string()),
                ]),
                rctxt: "rctxt".into(),
                z: "z".into(),
            },
            revocation: None,
        },
    );
    let cred_def_result = issuer.register_cred_def(cred_def.clone(), &key).await;
    assert!(cred_def_result.is_finished(), "{:?}", cred_def_result.reason);
    let cred_def_id = cred_def_result.id.expect("cred def id");

    let rev_reg_def = AnonCredsRevRegDef::new(
        issuer_id.clone(),
        cred_def_id.clone(),
        "registry-1",
        RevRegDefValue {
            public_keys: RevRegDefPublicKeys {
                accum_key: AccumKey { z: "1 0A 1 0B".into() },
            },
            max_cred_num: 6,
            tails_location: "https://tails.example/registry-1".into(),
            tails_hash: "2eQ7HfQ3dN3qCvh2BkWpb2Mq1Mv4Cw4H4Xo8Zr6Wm9vY".into(),
        },
    );
    let rev_reg_result = issuer.register_rev_reg_def(rev_reg_def.clone(), &key).await;
    assert!(rev_reg_result.is_finished(), "{:?}", rev_reg_result.reason);
    let rev_reg_id = rev_reg_result.id.expect("rev reg id");

    let v1 = rev_list(&issuer_id, &rev_reg_id, &[0; 6], "accum-v1");
    assert!(issuer.register_rev_list(v1.clone(), &key).await.is_finished());
    let v2 = rev_list(&issuer_id, &rev_reg_id, &[0, 1, 0, 1, 0, 0], "accum-v2");
    assert!(issuer.update_rev_list(&v1, v2.clone(), &[1, 3], &key).await.is_finished());
    let v3 = rev_list(&issuer_id, &rev_reg_id, &[0, 0, 0, 1, 0, 1], "accum-v3");
    assert!(issuer.update_rev_list(&v2, v3, &[5], &key).await.is_finished());

    let verifier = HederaAnonCredsRegistry::new(feed.clone());
    assert_eq!(verifier.get_schema(&schema_id).await.value, Some(schema));
    assert_eq!(verifier.get_cred_def(&cred_def_id).await.value, Some(cred_def));
    assert_eq!(verifier.get_rev_reg_def(&rev_reg_id).await.value, Some(rev_reg_def));

    let now = hiero_integration_tests::FEED_START_SECS + 3_600;
    let latest = verifier.get_rev_list(&rev_reg_id, now).await;
    assert_eq!(latest.error(), None);
    let latest = latest.value.expect("rev list");
    assert_eq!(latest.revocation_list, vec![0, 0, 0, 1, 0, 1]);
    assert_eq!(latest.current_accumulator, "accum-v3");
    assert_eq!(latest.issuer_id, issuer_id);

    let before_registry = verifier
        .get_rev_list(&rev_reg_id, hiero_integration_tests::FEED_START_SECS - 1)
        .await;
    assert_eq!(before_registry.error(), Some(ErrorKind::NotFound));
    Ok(())
}

#[tokio::test]
async fn test_rev_list_history_is_point_in_time() -> anyhow::Result<()> {
    let feed = feed();
    let (did, key) = registered_did(&feed, Arc::new(StaticDocumentFetcher::new())).await?;
    let issuer_id = did.identifier().expect("registered").to_string();
    let registry = HederaAnonCredsRegistry::new(feed.clone());

    let rev_reg_def = AnonCredsRevRegDef::new(
        issuer_id.clone(),
        format!("{issuer_id}/anoncreds/v0/PUBLIC_CRED_DEF/0.0.7"),
        "history",
        RevRegDefValue {
            public_keys: RevRegDefPublicKeys {
                accum_key: AccumKey { z: "z".into() },
            },
            max_cred_num: 4,
            tails_location: "https://tails.example/history".into(),
            tails_hash: "hash".into(),
        },
    );
    let rev_reg_id = registry
        .register_rev_reg_def(rev_reg_def, &key)
        .await
        .id
        .expect("rev reg id");

    let lists = [
        rev_list(&issuer_id, &rev_reg_id, &[0, 0, 0, 0], "a0"),
        rev_list(&issuer_id, &rev_reg_id, &[1, 0, 0, 0], "a1"),
        rev_list(&issuer_id, &rev_reg_id, &[1, 1, 0, 0], "a2"),
        rev_list(&issuer_id, &rev_reg_id, &[0, 1, 0, 1], "a3"),
    ];
    registry.register_rev_list(lists[0].clone(), &key).await;
    for (prev, curr) in lists.iter().zip(lists.iter().skip(1)) {
        let revoked = curr.revoked_since(prev);
        let result = registry.update_rev_list(prev, curr.clone(), &revoked, &key).await;
        assert!(result.is_finished(), "{:?}", result.reason);
    }

    // A verifier asking about the newest state first, then going back.
    let verifier = HederaAnonCredsRegistry::new(feed.clone());
    let newest = verifier
        .get_rev_list(&rev_reg_id, i64::MAX / 2)
        .await
        .value
        .expect("newest");
    assert_eq!(newest.revocation_list, lists[3].revocation_list);

    let entries_topic = feed_entries_topic(&feed, &rev_reg_id).await?;
    let stamps: Vec<i64> = feed
        .messages(&entries_topic)
        .iter()
        .map(|m| m.consensus_timestamp.seconds)
        .collect();
    assert_eq!(stamps.len(), lists.len());

    let queries = feed.query_count(&entries_topic);
    for (list, at) in lists.iter().zip(&stamps) {
        let resolved = verifier
            .get_rev_list(&rev_reg_id, *at)
            .await
            .value
            .expect("historic list");
        assert_eq!(resolved.revocation_list, list.revocation_list);
        assert_eq!(resolved.current_accumulator, list.current_accumulator);
        assert_eq!(resolved.timestamp, Some(*at));
    }
    assert_eq!(feed.query_count(&entries_topic), queries);
    Ok(())
}

async fn feed_entries_topic(
    feed: &Arc<hiero_hcs::InMemoryTopicFeed>,
    rev_reg_id: &str,
) -> anyhow::Result<hiero_core::TopicId> {
    use hiero_anoncreds::{AnonCredsIdentifier, JsonPayload, RevRegDefWithHcsMetadata};

    let id = AnonCredsIdentifier::parse(rev_reg_id)?;
    let payload = hiero_hcs::HcsFileService::new(feed.clone())
        .resolve_file(&id.topic_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("registry definition missing"))?;
    Ok(RevRegDefWithHcsMetadata::from_json(&payload)?.entries_topic_id()?)
}
