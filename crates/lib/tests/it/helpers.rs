use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use userd::{Directory, FixedClock, Role, User};

/// Password used for every account created by the helpers.
pub const PASSWORD: &str = "correct horse";

/// A directory rooted in a fresh temporary location, driven by a fixed clock.
pub struct TestDirectory {
    pub dir: TempDir,
    pub location: String,
    pub clock: Arc<FixedClock>,
    pub directory: Directory,
}

impl TestDirectory {
    /// Open another, independent handle on the same location, as a second
    /// process would.
    pub fn reopen(&self) -> Directory {
        Directory::open_with_clock(&self.location, self.clock.clone())
            .expect("Failed to reopen directory")
    }

    pub fn path(&self, file: &str) -> std::path::PathBuf {
        self.dir.path().join(file)
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn setup() -> TestDirectory {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let location = format!("file://{}", dir.path().display());
    let clock = Arc::new(FixedClock::new(start_time()));
    let directory =
        Directory::open_with_clock(&location, clock.clone()).expect("Failed to open directory");
    TestDirectory {
        dir,
        location,
        clock,
        directory,
    }
}

/// Create `role_name` if needed and a user holding it.
pub fn add_user(directory: &Directory, email: &str, role_name: &str) -> (Role, User) {
    let role = match directory.resolve_role_id(role_name) {
        Ok(role_id) => directory.store().role(&role_id).expect("role resolved"),
        Err(_) => directory.create_role(role_name).expect("Failed to create role"),
    };
    let user = directory
        .create_user(email, PASSWORD, "test account", &role.role_id)
        .expect("Failed to create user");
    (role, user)
}

/// Non-empty lines of a record file.
pub fn lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read record file")
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
