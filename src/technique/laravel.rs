// ABOUTME: Laravel technique for PHP applications served by php-fpm.
// ABOUTME: Installs composer dependencies, caches config, and runs pending migrations.

use super::{Probe, in_deploy_dir, unit_is_active};
use crate::project::Project;
use crate::remote::{RemoteError, RemoteExecutor};

pub(super) const PROBE: Probe = Probe::All(&["artisan", "composer.json"]);

const WEB_RUNTIME_UNIT: &str = "php-fpm";

pub(super) async fn deploy<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&in_deploy_dir(
        project,
        "composer install --no-dev --optimize-autoloader \
         && php artisan config:cache \
         && php artisan migrate --force",
    ))
    .await?;
    Ok(())
}

/// Restart php-fpm; a missing or failing unit is ignored.
pub(super) async fn restart<E: RemoteExecutor + ?Sized>(
    _project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&format!("systemctl restart {WEB_RUNTIME_UNIT} || true"))
        .await?;
    Ok(())
}

pub(super) async fn status<E: RemoteExecutor + ?Sized>(
    _project: &Project,
    exec: &E,
) -> Result<bool, RemoteError> {
    unit_is_active(exec, WEB_RUNTIME_UNIT).await
}
