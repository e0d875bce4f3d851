//! Compiled-in seeding configuration.
//!
//! The seeder takes no command-line arguments; everything it needs (bucket
//! name, credential filename, fixture directories, folder-name prefixes) is
//! fixed here.

/// Service account key, expected next to the data directories.
pub const SERVICE_ACCOUNT_FILE: &str = "serviceAccountKey.json";

/// Cloud Storage bucket receiving the image fixtures.
pub const STORAGE_BUCKET: &str = "inclusiveconnect-b47e2.firebasestorage.app";

/// Base directory holding per-entity image folders.
pub const PICS_DIR: &str = "data/pics";

/// Base directory holding the JSON fixture files.
pub const FIXTURES_DIR: &str = "data/database";

/// Password assigned to every provisioned test account.
pub const PLACEHOLDER_PASSWORD: &str = "123456";

/// Firestore allows at most 500 writes per batch; stay under it.
pub const BATCH_LIMIT: usize = 400;

/// One image-upload configuration: a local subdirectory of [`PICS_DIR`],
/// the remote path prefix its uploads land under, and the folder-name
/// prefix used to extract entity IDs.
#[derive(Clone, Copy, Debug)]
pub struct UploadSet {
    pub local_dir: &'static str,
    pub remote_prefix: &'static str,
    pub id_prefix: &'static str,
}

/// The two fixed upload configurations: profile pictures and post images.
pub const UPLOAD_SETS: [UploadSet; 2] = [
    UploadSet {
        local_dir: "profile_pics",
        remote_prefix: "profile-pics",
        id_prefix: "user",
    },
    UploadSet {
        local_dir: "post_images",
        remote_prefix: "post-images",
        id_prefix: "post",
    },
];
