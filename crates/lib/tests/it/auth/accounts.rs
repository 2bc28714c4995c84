use userd::{
    Error,
    auth::{AuthError, RoleRequirement},
};

use crate::helpers::{PASSWORD, add_user, setup};

#[test]
fn test_authenticate() {
    let ctx = setup();
    let (_, user) = add_user(&ctx.directory, "a@x.com", "admin");

    let authenticated = ctx.directory.authenticate("a@x.com", PASSWORD).unwrap();
    assert_eq!(authenticated, user);

    let err = ctx.directory.authenticate("a@x.com", "wrong").unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));

    let err = ctx.directory.authenticate("b@x.com", PASSWORD).unwrap_err();
    assert!(err.is_authentication_error());
    assert!(err.is_not_found());
}

#[test]
fn test_duplicates_rejected() {
    let ctx = setup();
    let (role, _) = add_user(&ctx.directory, "a@x.com", "admin");

    let err = ctx
        .directory
        .create_user("a@x.com", "other", "", &role.role_id)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(AuthError::UserAlreadyExists { .. })
    ));

    let err = ctx.directory.create_role("admin").unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(AuthError::RoleAlreadyExists { .. })
    ));

    // The original account is untouched.
    ctx.directory.authenticate("a@x.com", PASSWORD).unwrap();
}

#[test]
fn test_roles_listed_by_name() {
    let ctx = setup();
    for name in ["ops", "admin", "auditor"] {
        ctx.directory.create_role(name).unwrap();
    }
    let names: Vec<String> = ctx
        .directory
        .list_roles()
        .unwrap()
        .into_iter()
        .map(|role| role.name)
        .collect();
    assert_eq!(names, ["admin", "auditor", "ops"]);

    let ops = ctx.directory.resolve_role_id("ops").unwrap();
    assert_eq!(ctx.directory.store().role(&ops).unwrap().name, "ops");
    assert!(ctx.directory.resolve_role_id("root").unwrap_err().is_not_found());
}

#[test]
fn test_change_password() {
    let ctx = setup();
    let (_, user) = add_user(&ctx.directory, "a@x.com", "admin");

    let updated = ctx
        .directory
        .change_password("a@x.com", PASSWORD, "new-pass", "new-pass")
        .unwrap();
    assert_eq!(updated.user_id, user.user_id);
    assert_eq!(updated.created_at, user.created_at);
    assert_eq!(
        updated.credential().encoded_secret(),
        user.credential().encoded_secret()
    );
    assert_eq!(updated.credential().salt(), user.credential().salt());

    let other = ctx.reopen();
    other.authenticate("a@x.com", "new-pass").unwrap();
    assert!(
        other
            .authenticate("a@x.com", PASSWORD)
            .unwrap_err()
            .is_authentication_error()
    );
    assert_eq!(other.store().user_count(), 1);
}

#[test]
fn test_change_password_confirmation_mismatch() {
    let ctx = setup();
    add_user(&ctx.directory, "a@x.com", "admin");
    let before = std::fs::read(ctx.path("user.conf")).unwrap();

    let err = ctx
        .directory
        .change_password("a@x.com", PASSWORD, "new-pass", "new-pas")
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::PasswordMismatch)));

    assert_eq!(std::fs::read(ctx.path("user.conf")).unwrap(), before);
    ctx.directory.authenticate("a@x.com", PASSWORD).unwrap();
}

#[test]
fn test_change_password_requires_old_password() {
    let ctx = setup();
    add_user(&ctx.directory, "a@x.com", "admin");

    let err = ctx
        .directory
        .change_password("a@x.com", "guess", "new-pass", "new-pass")
        .unwrap_err();
    assert!(err.is_authentication_error());
    ctx.directory.authenticate("a@x.com", PASSWORD).unwrap();
}

#[test]
fn test_admin_gate() {
    let ctx = setup();
    add_user(&ctx.directory, "root@x.com", "admin");
    add_user(&ctx.directory, "dev@x.com", "ops");
    let admin = RoleRequirement::named("admin");

    ctx.directory
        .authenticate_for_role("root@x.com", PASSWORD, &admin)
        .unwrap();
    let err = ctx
        .directory
        .authenticate_for_role("dev@x.com", PASSWORD, &admin)
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::RoleMismatch { .. })));

    // Credentials are checked before the role.
    let err = ctx
        .directory
        .authenticate_for_role("dev@x.com", "wrong", &admin)
        .unwrap_err();
    assert!(err.is_authentication_error());
}
