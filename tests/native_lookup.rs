#![cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "linux"))]

use std::process::{Child, Command};

use nix::unistd::Pid;
use proc_name::{LookupError, NativeQuery, Process, ProcessNameLookup, lookup_process_name};
use similar_asserts::assert_eq;
use test_log::test;

fn spawn_sleep() -> Child {
    Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("sleep should be on PATH")
}

fn pid_of(child: &Child) -> Pid {
    Pid::from_raw(child.id() as i32)
}

#[test]
fn running_child_is_found_by_short_name() {
    let mut child = spawn_sleep();
    let pid = pid_of(&child);

    // The child may still be the forked copy of the test binary until exec
    // completes, so give it a moment to become `sleep`.
    let mut name = lookup_process_name(pid);
    for _ in 0..50 {
        if matches!(&name, Ok(n) if n.as_bytes() == b"sleep") {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
        name = lookup_process_name(pid);
    }

    child.kill().expect("kill sleep");
    child.wait().expect("reap sleep");

    assert_eq!(name.expect("child is running").to_str(), Ok("sleep"));
}

#[test]
fn reaped_child_is_not_found() {
    let mut child = spawn_sleep();
    let pid = pid_of(&child);
    child.kill().expect("kill sleep");
    child.wait().expect("reap sleep");

    assert_eq!(lookup_process_name(pid), Err(LookupError::NotFound(pid)));
}

#[test]
fn unused_pids_are_not_found() {
    for raw in [i32::MAX, -1] {
        let pid = Pid::from_raw(raw);
        assert_eq!(lookup_process_name(pid), Err(LookupError::NotFound(pid)));
    }
}

#[test]
fn own_pid_matches_own_command_name() {
    let lookup = ProcessNameLookup::new(NativeQuery::default());

    let name = lookup.lookup_self().expect("own pid is always present");

    assert!(!name.is_empty());
    assert_eq!(lookup_process_name(Pid::this()), Ok(name.clone()));

    #[cfg(target_os = "linux")]
    {
        let comm = std::fs::read_to_string("/proc/self/comm").expect("comm is readable");
        assert_eq!(name.to_string(), comm.trim_end_matches('\n'));
    }
}

#[test]
fn repeated_lookups_are_independent() {
    let first = lookup_process_name(Pid::this()).expect("own pid is always present");
    let mut second = lookup_process_name(Pid::this())
        .expect("own pid is always present")
        .into_c_string()
        .into_bytes();
    assert_eq!(first.as_bytes(), second.as_slice());

    second.fill(b'x');

    assert_eq!(lookup_process_name(Pid::this()), Ok(first));
}

#[test]
fn process_snapshot_of_self() {
    let process = Process::new(Pid::this()).expect("own pid is always present");
    let name = lookup_process_name(Pid::this()).expect("own pid is always present");

    assert_eq!(process.pid, Pid::this());
    assert_eq!(name.to_str(), Ok(process.name.as_str()));
}

#[cfg(target_os = "linux")]
#[test]
fn worker_thread_id_is_not_found() {
    use std::sync::mpsc;

    let (tid_tx, tid_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let worker = std::thread::Builder::new()
        .name("name-worker".to_string())
        .spawn(move || {
            tid_tx.send(nix::unistd::gettid()).expect("send tid");
            let _ = done_rx.recv();
        })
        .expect("spawn worker");

    let tid = tid_rx.recv().expect("worker reports its tid");
    let result = lookup_process_name(tid);

    done_tx.send(()).expect("release worker");
    worker.join().expect("worker exits");

    assert_eq!(result, Err(LookupError::NotFound(tid)));
}
