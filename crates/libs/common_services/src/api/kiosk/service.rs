use crate::api::kiosk::error::KioskError;
use crate::api::kiosk::interfaces::{
    FaceMatchRequest, FaceMatchResponse, MatchCandidate, NoMatchReason, PinLookupResponse,
};
use crate::database::customer_store::CustomerStore;
use crate::database::tables::customer::PinFace;
use crate::face_client::FaceEmbedder;
use crate::image_codec::strip_data_url_prefix;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Cosine distance, `1 - cos(a, b)`. Vectors of different length or with zero norm are as far
/// apart as unrelated ones.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Best (lowest) distance per customer, closest customer first.
#[must_use]
pub fn rank_candidates(query: &[f32], faces: &[PinFace]) -> Vec<MatchCandidate> {
    let mut best: HashMap<Uuid, MatchCandidate> = HashMap::new();
    for face in faces {
        let distance = cosine_distance(query, face.face_embedding.as_slice());
        let closer = best
            .get(&face.customer_id)
            .is_none_or(|existing| distance < existing.distance);
        if closer {
            best.insert(
                face.customer_id,
                MatchCandidate {
                    customer_id: face.customer_id,
                    name: face.name.clone(),
                    image_path: face.image_path.clone(),
                    distance,
                },
            );
        }
    }

    let mut candidates: Vec<MatchCandidate> = best.into_values().collect();
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    candidates
}

/// Keeps the candidates within `threshold`. With none left, every candidate is reported back.
#[must_use]
pub fn evaluate_match(candidates: Vec<MatchCandidate>, threshold: f32) -> FaceMatchResponse {
    let matches: Vec<MatchCandidate> = candidates
        .iter()
        .filter(|c| c.distance <= threshold)
        .cloned()
        .collect();

    if matches.is_empty() {
        return FaceMatchResponse::Unmatched {
            ok: false,
            error: "No matches found".to_string(),
            reason: NoMatchReason::NoMatch,
            threshold: Some(threshold),
            candidates: Some(candidates),
        };
    }

    FaceMatchResponse::Matched {
        ok: true,
        threshold,
        matches,
    }
}

/// Whether a PIN belongs to at least one customer with a stored face.
#[instrument(skip_all)]
pub async fn pin_lookup(pool: &PgPool, pin: &str) -> Result<PinLookupResponse, KioskError> {
    let face_count = CustomerStore::count_faces_by_pin(pool, pin.trim()).await?;
    if face_count == 0 {
        return Ok(PinLookupResponse::not_recognized());
    }
    Ok(PinLookupResponse::eligible())
}

/// Matches a live capture against every customer that shares the given PIN.
#[instrument(skip_all)]
pub async fn face_match<E>(
    pool: &PgPool,
    embedder: &E,
    threshold: f32,
    request: &FaceMatchRequest,
) -> Result<FaceMatchResponse, KioskError>
where
    E: FaceEmbedder + ?Sized,
{
    if request.face_image.trim().is_empty() {
        return Err(KioskError::Validation("Face image is required".into()));
    }
    let pin = request.pin.trim();

    let query = embedder
        .embed(strip_data_url_prefix(&request.face_image))
        .await
        .map_err(|e| KioskError::from_inference(&e))?;

    let customers = CustomerStore::find_by_pin(pool, pin).await?;
    if customers.is_empty() {
        return Ok(FaceMatchResponse::unmatched(NoMatchReason::NoCustomers));
    }

    let faces = CustomerStore::faces_by_pin(pool, pin).await?;
    if faces.is_empty() {
        return Ok(FaceMatchResponse::unmatched(NoMatchReason::NoFaces));
    }

    let response = evaluate_match(rank_candidates(&query, &faces), threshold);
    match &response {
        FaceMatchResponse::Matched { matches, .. } => info!(
            customer_ids = ?matches.iter().map(|m| m.customer_id).collect::<Vec<_>>(),
            "Kiosk face matches found"
        ),
        FaceMatchResponse::Unmatched { .. } => {
            warn!(threshold, "No kiosk face match found");
        }
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgvector::Vector;
    use serde_json::json;

    fn face(customer_id: Uuid, name: &str, image: &str, embedding: Vec<f32>) -> PinFace {
        PinFace {
            customer_id,
            name: name.to_string(),
            image_path: image.to_string(),
            face_embedding: Vector::from(embedding),
        }
    }

    #[test]
    fn test_cosine_distance() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        // Scale does not matter.
        assert!(cosine_distance(&[1.0, 2.0], &[2.0, 4.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance_degenerate_inputs() {
        assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[], &[]), 1.0);
    }

    #[test]
    fn test_rank_candidates_keeps_best_face_per_customer() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let faces = vec![
            face(alice, "Alice", "alice-1.jpg", vec![0.0, 1.0]),
            face(alice, "Alice", "alice-2.jpg", vec![1.0, 0.1]),
            face(bob, "Bob", "bob-1.jpg", vec![1.0, 1.0]),
        ];

        let ranked = rank_candidates(&[1.0, 0.0], &faces);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].customer_id, alice);
        assert_eq!(ranked[0].image_path, "alice-2.jpg");
        assert_eq!(ranked[1].customer_id, bob);
        assert!(ranked[0].distance < ranked[1].distance);
    }

    #[test]
    fn test_evaluate_match_filters_by_threshold() {
        let near = MatchCandidate {
            customer_id: Uuid::new_v4(),
            name: "Near".into(),
            image_path: "near.jpg".into(),
            distance: 0.2,
        };
        let far = MatchCandidate {
            distance: 0.7,
            name: "Far".into(),
            ..near.clone()
        };

        let response = evaluate_match(vec![near.clone(), far.clone()], 0.4);
        assert_eq!(
            response,
            FaceMatchResponse::Matched {
                ok: true,
                threshold: 0.4,
                matches: vec![near],
            }
        );

        let response = evaluate_match(vec![far.clone()], 0.4);
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["reason"], "no_match");
        assert_eq!(body["candidates"][0]["name"], "Far");
    }

    #[test]
    fn test_unmatched_response_shape() {
        let body = serde_json::to_value(FaceMatchResponse::unmatched(NoMatchReason::NoFaces)).unwrap();
        assert_eq!(
            body,
            json!({ "ok": false, "error": "No faces found for pin", "reason": "no_faces" })
        );
    }

    #[test]
    fn test_pin_lookup_response_shape() {
        assert_eq!(
            serde_json::to_value(PinLookupResponse::eligible()).unwrap(),
            json!({ "ok": true, "eligible": true })
        );
        assert_eq!(
            serde_json::to_value(PinLookupResponse::not_recognized()).unwrap(),
            json!({ "ok": false, "error": "PIN not recognized" })
        );
    }
}
