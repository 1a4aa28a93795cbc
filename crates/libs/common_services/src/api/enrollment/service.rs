use super::error::EnrollmentError;
use super::interfaces::{EnrollCustomerRequest, EnrollResponse, EnrollmentOptions};
use crate::database::enrollment_store::EnrollmentStore;
use crate::database::tables::customer::{Customer, CustomerFace, NewCustomer, NewFaceCapture};
use crate::face_client::FaceEmbedder;
use crate::image_codec::{capture_file_name, decode_image, strip_data_url_prefix};
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

/// Where an enrollment is in its lifecycle. Used to say how far a failed enrollment got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStage {
    Started,
    CustomerCreated,
    Decoded { index: usize },
    FileWritten { index: usize },
    Embedded { index: usize },
    Recorded { index: usize },
    Committed,
    Aborted,
}

impl fmt::Display for EnrollmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::CustomerCreated => write!(f, "customer created"),
            Self::Decoded { index } => write!(f, "capture {index} decoded"),
            Self::FileWritten { index } => write!(f, "capture {index} written"),
            Self::Embedded { index } => write!(f, "capture {index} embedded"),
            Self::Recorded { index } => write!(f, "capture {index} recorded"),
            Self::Committed => write!(f, "committed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Progress of one enrollment, including the files it put on disk.
struct EnrollmentRun {
    stage: EnrollmentStage,
    written_files: Vec<PathBuf>,
}

impl EnrollmentRun {
    const fn new() -> Self {
        Self {
            stage: EnrollmentStage::Started,
            written_files: Vec::new(),
        }
    }

    fn advance(&mut self, stage: EnrollmentStage) {
        debug!("Enrollment: {} -> {}", self.stage, stage);
        self.stage = stage;
    }
}

/// Checks everything that can be checked before any side effect happens.
fn validate_request(
    request: &EnrollCustomerRequest,
    options: &EnrollmentOptions,
) -> Result<(), EnrollmentError> {
    if request.name.trim().is_empty() {
        return Err(EnrollmentError::Validation("Name is required".into()));
    }
    let pin = request.pin.trim();
    if !(4..=8).contains(&pin.len()) || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(EnrollmentError::Validation(
            "PIN must be 4 to 8 digits".into(),
        ));
    }
    if request.captures.is_empty() {
        return Err(EnrollmentError::Validation(
            "At least one face capture is required".into(),
        ));
    }
    if request.captures.len() > options.max_captures {
        return Err(EnrollmentError::Validation(format!(
            "At most {} face captures are allowed",
            options.max_captures
        )));
    }
    Ok(())
}

/// Registers a customer together with all of their face captures, or nothing at all.
///
/// One transaction spans the customer row and every capture row. Per capture the image is
/// decoded, written to the images root, embedded by the face service and recorded, in that
/// order. Any failure rolls the transaction back.
///
/// Image files are written before their row and outside the transaction. On abort every file
/// this enrollment created is deleted again. A file that cannot be deleted is logged and left
/// to the orphan sweep.
#[instrument(skip_all, fields(customer = %request.name, captures = request.captures.len()))]
pub async fn enroll_customer<S, E>(
    store: &S,
    embedder: &E,
    options: &EnrollmentOptions,
    request: &EnrollCustomerRequest,
) -> Result<EnrollResponse, EnrollmentError>
where
    S: EnrollmentStore + ?Sized,
    E: FaceEmbedder + ?Sized,
{
    validate_request(request, options)?;

    let mut run = EnrollmentRun::new();
    let mut tx = store.begin().await?;

    let outcome = record_enrollment(store, &mut tx, embedder, options, request, &mut run).await;
    let (customer, faces) = match outcome {
        Ok(recorded) => recorded,
        Err(err) => {
            abort(store, tx, request, &mut run, &err).await;
            return Err(err);
        }
    };

    if let Err(err) = store.commit(tx).await {
        let err = EnrollmentError::from(err);
        error!(
            "Commit failed for customer '{}', orphaned files: {:?}",
            request.name, run.written_files
        );
        return Err(err);
    }
    run.advance(EnrollmentStage::Committed);

    info!(
        customer_id = %customer.id,
        face_count = faces.len(),
        "Customer registration created"
    );

    Ok(EnrollResponse {
        ok: true,
        customer_id: customer.id,
        face_count: faces.len(),
        image_paths: faces.into_iter().map(|face| face.image_path).collect(),
    })
}

/// All writes of an enrollment, run inside `tx`. Does not commit or roll back.
async fn record_enrollment<S, E>(
    store: &S,
    tx: &mut S::Tx,
    embedder: &E,
    options: &EnrollmentOptions,
    request: &EnrollCustomerRequest,
    run: &mut EnrollmentRun,
) -> Result<(Customer, Vec<CustomerFace>), EnrollmentError>
where
    S: EnrollmentStore + ?Sized,
    E: FaceEmbedder + ?Sized,
{
    let customer = store
        .create_customer(
            tx,
            &NewCustomer {
                name: request.name.trim().to_string(),
                pin: request.pin.trim().to_string(),
            },
        )
        .await?;
    run.advance(EnrollmentStage::CustomerCreated);

    let enrollment_timestamp = Utc::now().timestamp_millis();
    let mut faces = Vec::with_capacity(request.captures.len());

    for (index, capture) in request.captures.iter().enumerate() {
        let image = decode_image(capture.image())
            .map_err(|source| EnrollmentError::Decode { index, source })?;
        run.advance(EnrollmentStage::Decoded { index });

        let file_name = capture_file_name(
            &customer.name,
            customer.id,
            index,
            capture.timestamp().unwrap_or(enrollment_timestamp),
            image.extension,
        );
        let file_path = options.images_dir.join(&file_name);
        write_new_file(&file_path, &image.bytes, &mut run.written_files).await?;
        run.advance(EnrollmentStage::FileWritten { index });

        let embedding = embedder
            .embed(strip_data_url_prefix(capture.image()))
            .await
            .map_err(|e| EnrollmentError::from_inference(&e))?;
        if embedding.len() != options.embedding_dimension {
            return Err(EnrollmentError::Validation(format!(
                "Failed to extract face - expected a {}-dimensional embedding, got {}",
                options.embedding_dimension,
                embedding.len()
            )));
        }
        run.advance(EnrollmentStage::Embedded { index });

        let capture_index = i32::try_from(index)
            .map_err(|_| EnrollmentError::Validation("Too many face captures".into()))?;
        let face = store
            .add_face_capture(
                tx,
                &NewFaceCapture {
                    customer_id: customer.id,
                    embedding,
                    image_path: file_name,
                    capture_index,
                },
            )
            .await?;
        run.advance(EnrollmentStage::Recorded { index });
        faces.push(face);
    }

    Ok((customer, faces))
}

/// Writes a capture to disk, refusing to overwrite an existing file.
///
/// The path is added to `created` as soon as the file exists, so a write that fails halfway
/// still leaves the partial file known to the caller.
async fn write_new_file(
    path: &Path,
    bytes: &[u8],
    created: &mut Vec<PathBuf>,
) -> Result<(), EnrollmentError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    created.push(path.to_path_buf());
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

async fn abort<S>(
    store: &S,
    tx: S::Tx,
    request: &EnrollCustomerRequest,
    run: &mut EnrollmentRun,
    err: &EnrollmentError,
) where
    S: EnrollmentStore + ?Sized,
{
    let failed_after = run.stage;
    if let Err(rollback_err) = store.rollback(tx).await {
        error!("Rollback failed: {}", rollback_err);
    }
    run.advance(EnrollmentStage::Aborted);

    warn!(
        stage = %failed_after,
        code = err.code(),
        "Enrollment for '{}' aborted: {}",
        request.name,
        err
    );

    let orphans = remove_files(&run.written_files).await;
    if !orphans.is_empty() {
        warn!(
            "Enrollment for '{}' left {} orphaned image file(s): {:?}",
            request.name,
            orphans.len(),
            orphans
        );
    }
}

/// Best-effort removal. Returns the paths that are still on disk.
async fn remove_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut remaining = Vec::new();
    for path in paths {
        match fs::remove_file(path).await {
            Ok(()) => debug!("Removed {:?}", path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!("Could not remove {:?}: {}", path, e);
                remaining.push(path.clone());
            }
        }
    }
    remaining
}
