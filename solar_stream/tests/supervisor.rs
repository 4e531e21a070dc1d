//! Supervisor behaviour against `/bin/sh` scripts standing in for the engine

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use common::{Frame, Method};
use solar_stream::{
    BinaryLauncher, EngineLauncher, SpawnParams, Status, Supervisor, SupervisorError,
};

const PATIENCE: Duration = Duration::from_secs(5);

/// Runs `sh <input>`, ignoring every other parameter
struct ScriptLauncher;

impl EngineLauncher for ScriptLauncher {
    fn command(&self, params: &SpawnParams) -> Command {
        let mut command = Command::new("sh");
        command.arg(&params.input);
        command
    }
}

fn script(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("solar_stream_{}_{name}.sh", std::process::id()));
    fs::write(&path, body).unwrap();
    path
}

fn params(path: &Path) -> SpawnParams {
    SpawnParams::new(Method::Verlet, path)
}

fn collect(frames: &mut Vec<Frame>) -> impl FnMut(&Frame) + '_ {
    move |frame: &Frame| frames.push(frame.clone())
}

fn alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

const TWO_FRAMES: &str = "\
echo 't r0,0 r0,1 r0,2 v0,0 v0,1 v0,2'
echo '# Probe 2.000000e+00'
echo '0.000000e+00 1 0 0 0 1 0'
echo '1.000000e-01 2 0 0 0 1 0'
";

#[test]
fn one_frame_per_resume() {
    let path = script("backpressure", TWO_FRAMES);
    let mut supervisor = Supervisor::new(ScriptLauncher);
    supervisor.start(params(&path)).unwrap();
    assert_eq!(supervisor.status(), Status::Reading);
    assert!(supervisor.in_flight());

    let mut frames = Vec::new();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Suspended);
    assert_eq!(frames.len(), 1);
    assert!(!supervisor.in_flight(), "no read while suspended");

    // Everything is already in the pipe, yet nothing is consumed without resume
    thread::sleep(Duration::from_millis(100));
    assert_eq!(supervisor.poll(&mut collect(&mut frames)), Status::Suspended);
    assert_eq!(supervisor.wait(Duration::from_millis(50), &mut collect(&mut frames)), Status::Suspended);
    assert_eq!(frames.len(), 1);
    assert_eq!(supervisor.frames_decoded(), 1);
    assert_eq!(frames[0].states[0].position.x, 1.0);

    assert!(supervisor.resume());
    assert!(!supervisor.resume(), "only one read per resume");
    assert!(supervisor.in_flight());
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Suspended);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].t, 0.1);
    assert_eq!(supervisor.latest().unwrap(), frames[1]);
    assert_eq!(supervisor.catalog()[0].name, "Probe");
    assert_eq!(supervisor.catalog()[0].mass, 2.0);

    assert!(supervisor.resume());
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Finished);
    assert_eq!(frames.len(), 2);
    assert!(supervisor.exit_status().unwrap().success());
    assert_eq!(supervisor.child_id(), None);
    assert!(!supervisor.resume());
}

#[test]
fn restart_twice_leaves_one_child_and_fresh_catalog() {
    let endless = |name: &str| {
        format!(
            "echo 't'\necho '# {name} 1.0'\nwhile :; do echo '5.0e-01 1 2 3 4 5 6'; sleep 0.05; done\n"
        )
    };
    let old = script("restart_old", &endless("Old"));
    let middle = script("restart_middle", &endless("Middle"));
    let new = script("restart_new", &endless("New"));

    let mut supervisor = Supervisor::new(ScriptLauncher);
    supervisor.start(params(&old)).unwrap();
    let first = supervisor.child_id().unwrap();

    assert!(supervisor.set_input(&middle).unwrap());
    let second = supervisor.child_id().unwrap();
    assert!(supervisor.set_input(&new).unwrap());
    let third = supervisor.child_id().unwrap();

    assert!(!alive(first));
    assert!(!alive(second));
    assert!(alive(third));
    assert_eq!(supervisor.generation(), 3);
    assert!(supervisor.catalog().is_empty());

    let mut frames = Vec::new();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Suspended);
    let names: Vec<&str> = supervisor.catalog().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["New"]);
    assert_eq!(frames.len(), 1);

    supervisor.stop();
    assert!(!alive(third));
}

#[test]
fn spawn_failure_leaves_nothing_behind() {
    let mut supervisor = Supervisor::new(BinaryLauncher::new("/nonexistent/engines"));
    let err = supervisor
        .start(SpawnParams::new(Method::Euler, "two.txt"))
        .unwrap_err();
    match &err {
        SupervisorError::Spawn { program, .. } => assert!(program.ends_with("euler")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("/nonexistent/engines"));
    assert_eq!(supervisor.status(), Status::Stopped);
    assert_eq!(supervisor.child_id(), None);
    assert!(!supervisor.in_flight());
}

#[test]
fn engine_exit_code_is_reported() {
    let path = script(
        "exit_code",
        "echo 't'\necho '# A 1.0'\necho '0 1 2 3 4 5 6'\necho 'cannot continue' >&2\nexit 1\n",
    );
    let mut supervisor = Supervisor::new(ScriptLauncher);
    supervisor.start(params(&path)).unwrap();

    let mut frames = Vec::new();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Suspended);
    assert_eq!(supervisor.exit_status(), None);

    supervisor.resume();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Failed);
    assert_eq!(supervisor.exit_status().and_then(|exit| exit.code()), Some(1));
    assert_eq!(supervisor.child_id(), None);
    assert_eq!(frames.len(), 1);

    // a fresh run forgets the previous exit
    supervisor.restart().unwrap();
    assert_eq!(supervisor.exit_status(), None);
}

#[test]
fn malformed_lines_are_skipped() {
    let path = script(
        "malformed",
        "\
echo 't r0,0'
echo '# A 1.0'
echo '# broken'
echo ''
echo 'abc 1 2'
echo '1.0 1 2 3'
echo '# Late 1.0'
echo '2.0 1 2 3 4 5 6'
",
    );
    let mut supervisor = Supervisor::new(ScriptLauncher);
    supervisor.start(params(&path)).unwrap();

    let mut frames = Vec::new();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Suspended);
    assert_eq!(frames[0].t, 1.0);
    assert_eq!(frames[0].states.len(), 1);
    assert_eq!(frames[0].states[0].position.to_array(), [1.0, 2.0, 3.0]);
    assert_eq!(frames[0].states[0].velocity.to_array(), [0.0, 0.0, 0.0]);

    supervisor.resume();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Suspended);
    assert_eq!(frames[1].states[0].velocity.to_array(), [4.0, 5.0, 6.0]);
    assert_eq!(supervisor.catalog().len(), 1, "late declaration ignored");

    supervisor.resume();
    assert_eq!(supervisor.wait(PATIENCE, &mut collect(&mut frames)), Status::Finished);
}

#[test]
fn stop_is_idempotent() {
    let path = script("stop", "echo t\nexec sleep 30\n");
    let mut supervisor = Supervisor::new(ScriptLauncher);
    supervisor.stop();
    assert_eq!(supervisor.status(), Status::Stopped);

    supervisor.start(params(&path)).unwrap();
    let pid = supervisor.child_id().unwrap();
    supervisor.stop();
    supervisor.stop();
    assert_eq!(supervisor.status(), Status::Stopped);
    assert_eq!(supervisor.child_id(), None);
    assert!(!alive(pid));
    assert!(!supervisor.resume());
}

#[test]
fn drop_kills_the_child() {
    let path = script("drop", "exec sleep 30\n");
    let mut supervisor = Supervisor::new(ScriptLauncher);
    supervisor.start(params(&path)).unwrap();
    let pid = supervisor.child_id().unwrap();
    drop(supervisor);
    assert!(!alive(pid));
}

#[test]
fn unchanged_params_do_not_restart() {
    let path = script("unchanged", TWO_FRAMES);
    let mut supervisor = Supervisor::new(ScriptLauncher);
    assert!(matches!(supervisor.restart(), Err(SupervisorError::NoParams)));
    assert!(matches!(supervisor.set_dt(0.5), Err(SupervisorError::NoParams)));

    assert!(supervisor.set_params(params(&path)).unwrap());
    let pid = supervisor.child_id();
    assert!(!supervisor.set_params(params(&path)).unwrap());
    assert!(!supervisor.set_method(Method::Verlet).unwrap());
    assert_eq!(supervisor.child_id(), pid);
    assert_eq!(supervisor.generation(), 1);

    assert!(supervisor.set_dt(0.5).unwrap());
    assert_eq!(supervisor.generation(), 2);
    assert_eq!(supervisor.params().unwrap().dt, 0.5);

    assert!(supervisor.set_t_end(Some(2.0)).unwrap());
    assert!(supervisor.set_method(Method::Euler).unwrap());
    assert_eq!(supervisor.params().unwrap().method, Method::Euler);
    assert_eq!(supervisor.generation(), 4);

    supervisor.stop();
    assert!(supervisor.set_params(params(&path).with_dt(0.5).with_t_end(2.0)).is_ok());
}
