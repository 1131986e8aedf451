//! Example: Walk the permission form through a team and a user grant.

use dsacl_core::{init_tracing, AppConfig, PermissionLevel, TargetKind, Team, User};
use dsacl_form::{DataSourceAcl, PermissionForm};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_with_env()?;
    init_tracing(&config.logging)?;

    let acl = Arc::new(DataSourceAcl::new(1));
    acl.open_form();
    let form = PermissionForm::with_config(Arc::clone(&acl), config.form);

    // Grant a team the default level
    form.select_target_kind(TargetKind::Team);
    form.select_team(Some(&Team::new(42, "operators")));
    println!("Submit enabled: {}", form.view().submit_enabled);
    println!("Outcome: {:?}\n", form.submit().await);

    // Grant a user edit rights
    form.select_target_kind(TargetKind::User);
    form.select_user(Some(&User::new(7, "alice")));
    form.select_permission(PermissionLevel::Edit);
    println!("Outcome: {:?}\n", form.submit().await);

    // Submitting the same team again is refused by the list, and the form still resets
    form.select_target_kind(TargetKind::Team);
    form.select_team(Some(&Team::new(42, "operators")));
    println!("Outcome: {:?}\n", form.submit().await);

    println!("Permissions on data source {}:", acl.datasource_id());
    for item in acl.items() {
        println!("  • {} → {}", item.grantee, item.permission);
    }

    form.cancel();
    println!("\nForm open: {}", acl.is_adding());
    Ok(())
}
