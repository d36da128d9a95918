// ABOUTME: Integration tests for technique detection and first-match selection.
// ABOUTME: Runs probes and status checks against the in-memory remote.

mod support;

use skiff::technique::{DEFAULT_REGISTRY, Technique, select};
use support::{FakeRemote, demo_project};

#[tokio::test]
async fn first_match_wins_over_later_matches() {
    let fake = FakeRemote::new()
        .with_deploy_file("compose.yml")
        .with_deploy_file("package.json");
    let registry = [Technique::Docker, Technique::Node, Technique::Static];

    let chosen = select(&registry, &fake, &demo_project()).await;
    assert_eq!(chosen, Some(Technique::Docker));
}

#[tokio::test]
async fn registry_order_decides_not_specificity() {
    let fake = FakeRemote::new()
        .with_deploy_file("compose.yml")
        .with_deploy_file("package.json");
    let registry = [Technique::Node, Technique::Docker, Technique::Static];

    let chosen = select(&registry, &fake, &demo_project()).await;
    assert_eq!(chosen, Some(Technique::Node));
}

#[tokio::test]
async fn catch_all_matches_empty_project() {
    let fake = FakeRemote::new().with_demo();

    let chosen = select(&DEFAULT_REGISTRY, &fake, &demo_project()).await;
    assert_eq!(chosen, Some(Technique::Static));
}

#[tokio::test]
async fn no_match_without_catch_all() {
    let fake = FakeRemote::new().with_demo();
    let registry = [Technique::Docker, Technique::Node];

    assert_eq!(select(&registry, &fake, &demo_project()).await, None);
}

#[tokio::test]
async fn probe_errors_count_as_non_match() {
    let project = demo_project();
    let fake = FakeRemote::new()
        .break_path(project.deploy_path("docker-compose.yml"))
        .with_deploy_file("package.json");

    let chosen = select(&DEFAULT_REGISTRY, &fake, &project).await;
    assert_eq!(chosen, Some(Technique::Node));
}

#[tokio::test]
async fn laravel_needs_both_markers() {
    let project = demo_project();

    let partial = FakeRemote::new().with_deploy_file("artisan");
    assert!(!Technique::Laravel.detect(&partial, &project).await.unwrap());

    let full = FakeRemote::new()
        .with_deploy_file("artisan")
        .with_deploy_file("composer.json");
    assert!(Technique::Laravel.detect(&full, &project).await.unwrap());
}

#[tokio::test]
async fn python_accepts_either_marker() {
    let project = demo_project();

    let fake = FakeRemote::new().with_deploy_file("pyproject.toml");
    assert!(Technique::Python.detect(&fake, &project).await.unwrap());
}

#[tokio::test]
async fn node_status_reads_pm2_state() {
    let project = demo_project();

    let online = FakeRemote::new().respond("pm2 describe", "status │ online\n");
    assert!(Technique::Node.status(&project, &online).await.unwrap());

    let stopped = FakeRemote::new().respond("pm2 describe", "status │ stopped\n");
    assert!(!Technique::Node.status(&project, &stopped).await.unwrap());
}

#[tokio::test]
async fn systemd_inactive_is_not_running() {
    let project = demo_project();

    let inactive = FakeRemote::new().respond("systemctl is-active", "inactive\n");
    assert!(!Technique::Python.status(&project, &inactive).await.unwrap());

    let active = FakeRemote::new().respond("systemctl is-active", "active\n");
    assert!(Technique::Python.status(&project, &active).await.unwrap());
    assert!(Technique::Laravel.status(&project, &active).await.unwrap());
}

#[tokio::test]
async fn docker_status_reads_running_containers() {
    let project = demo_project();

    let running = FakeRemote::new().respond("docker compose ps", "3f2a9c1b\n");
    assert!(Technique::Docker.status(&project, &running).await.unwrap());

    let idle = FakeRemote::new();
    assert!(!Technique::Docker.status(&project, &idle).await.unwrap());
}

#[tokio::test]
async fn commands_run_inside_deploy_dir_with_escaping() {
    let project = demo_project();
    let fake = FakeRemote::new();

    Technique::Python.deploy(&project, &fake).await.unwrap();
    Technique::Python.restart(&project, &fake).await.unwrap();

    let commands = fake.commands();
    assert_eq!(
        commands[0],
        "cd '/var/www/demo' && if [ -f requirements.txt ]; then pip install -r requirements.txt; fi"
    );
    assert!(commands[1].contains("systemctl restart 'demo' || true"));
}

#[tokio::test]
async fn static_technique_runs_nothing() {
    let project = demo_project();
    let fake = FakeRemote::new();

    Technique::Static.deploy(&project, &fake).await.unwrap();
    Technique::Static.restart(&project, &fake).await.unwrap();
    assert!(Technique::Static.status(&project, &fake).await.unwrap());
    assert!(fake.commands().is_empty());
}
