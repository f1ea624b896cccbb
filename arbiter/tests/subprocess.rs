#![cfg(unix)]

use std::time::{Duration, Instant};

use arbiter::prelude::*;

/// A command running `script` with `sh`, where the first per-call argument is `$1`.
fn sh(script: &str) -> OracleCommand {
    OracleCommand::new("sh")
        .arg("-c")
        .arg(script)
        .arg("oracle")
        .with_timeout(Some(Duration::from_secs(10)))
}

fn rules(script: &str) -> SubprocessRules {
    SubprocessRules::new(sh(script))
}

fn decision(script: &str) -> SubprocessDecision {
    SubprocessDecision::new(sh(script))
}

fn mv(s: &str) -> Move {
    Move::from_uci(s).unwrap()
}

#[test]
fn test_output_is_stdout_then_stderr() {
    let output = sh("echo err >&2; echo out").run(["ignored"]).unwrap();
    assert_eq!(output, "out\nerr\n");
}

#[test]
fn test_per_call_arguments_follow_fixed_ones() {
    let output = sh(r#"echo "$# $1 $2""#).run(["first", "second"]).unwrap();
    assert_eq!(output.trim(), "2 first second");
}

#[test]
fn test_runs_in_directory() {
    let command = sh("[ -f Cargo.toml ] && echo SUCCESS || echo FAILURE")
        .in_dir(env!("CARGO_MANIFEST_DIR"));
    let oracle = SubprocessRules::new(command);

    assert!(oracle.is_in_check(&Board::new(), Color::White).unwrap());
}

#[test]
fn test_verdict_per_predicate() {
    let oracle = rules(
        r#"echo "% banner"
        case "$1" in
            *legal_move*) echo SUCCESS ;;
            *) echo FAILURE ;;
        esac"#,
    );
    let board = Board::new();

    assert!(oracle.is_legal_move(&board, Color::White, mv("e2e4")).unwrap());
    assert!(!oracle.is_valid_move(&board, Color::White, mv("e2e4")).unwrap());
    assert!(!oracle.is_in_check(&board, Color::White).unwrap());
    assert!(!oracle.is_checkmate(&board, Color::Black).unwrap());
}

#[test]
fn test_goal_is_the_final_argument() {
    let mut board = Board::empty();
    board.set_piece_at(Square::from_uci("e2").unwrap(), Some(Piece::WHITE_PAWN));

    let expected = "(Board = [piece(pawn,white,2,5)], legal_move(Board, white, 2, 5, 4, 5) -> ";
    let oracle = rules(&format!(
        r#"case "$1" in "{expected}"*) echo SUCCESS ;; *) echo FAILURE ;; esac"#
    ));

    assert!(oracle.is_legal_move(&board, Color::White, mv("e2e4")).unwrap());
    assert!(!oracle.is_legal_move(&board, Color::White, mv("e2e3")).unwrap());
}

#[test]
fn test_verdict_on_stderr_counts() {
    let oracle = rules("echo SUCCESS >&2");
    assert!(oracle.is_in_check(&Board::new(), Color::Black).unwrap());
}

#[test]
fn test_exit_status_is_ignored() {
    let oracle = rules("echo FAILURE; exit 3");
    assert!(!oracle.is_in_check(&Board::new(), Color::Black).unwrap());
}

#[test]
fn test_unrecognized_verdicts() {
    let board = Board::new();

    for script in ["echo 'SUCCESS FAILURE'", "true", "echo maybe"] {
        let err = rules(script)
            .is_checkmate(&board, Color::White)
            .unwrap_err();
        assert!(
            matches!(err, OracleError::Malformed { .. }),
            "{script:?} gave {err:?}"
        );
    }
}

#[test]
fn test_noisy_enumeration() {
    let oracle = rules(
        r#"echo "Warning: singleton variables"
        echo "[move(2,5,4,5),move(1,7,3,6),move(2,5,9,5)]"
        echo "move(7,5,5,5)" >&2"#,
    );

    let moves = oracle.legal_moves(&Board::new(), Color::White).unwrap();
    assert_eq!(moves, [mv("e2e4"), mv("g1f3"), mv("e7e5")]);
}

#[test]
fn test_enumeration_without_records() {
    let oracle = rules("echo '[]'");
    assert!(oracle
        .legal_moves(&Board::new(), Color::White)
        .unwrap()
        .is_empty());
}

#[test]
fn test_missing_program() {
    let oracle = SubprocessRules::new(OracleCommand::new("/nonexistent/rules-oracle"));

    let err = oracle.is_in_check(&Board::new(), Color::White).unwrap_err();
    assert!(matches!(err, OracleError::Spawn { .. }), "{err:?}");

    let err = oracle.legal_moves(&Board::new(), Color::White).unwrap_err();
    assert!(matches!(err, OracleError::Spawn { .. }), "{err:?}");
}

#[test]
fn test_hung_oracle_times_out() {
    let command = OracleCommand::new("sh")
        .args(["-c", "exec sleep 5", "oracle"])
        .with_timeout(Some(Duration::from_millis(100)));
    let oracle = SubprocessRules::new(command);

    let start = Instant::now();
    let err = oracle.is_in_check(&Board::new(), Color::White).unwrap_err();

    assert!(matches!(err, OracleError::Timeout { .. }), "{err:?}");
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_timeout_leaves_no_process_behind() {
    let pid_file = std::env::temp_dir().join(format!("arbiter-oracle-{}.pid", std::process::id()));
    let script = format!("echo $$ > '{}'; exec sleep 5", pid_file.display());
    let command = OracleCommand::new("sh")
        .args(["-c", script.as_str(), "oracle"])
        .with_timeout(Some(Duration::from_millis(200)));

    let err = command.run(["ignored"]).unwrap_err();
    assert!(matches!(err, OracleError::Timeout { .. }), "{err:?}");

    // `exec` made the sleep the launched process itself, so it was killed and reaped
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    std::fs::remove_file(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(!alive.success(), "oracle {} outlived its call", pid.trim());
}

#[test]
fn test_decision_arguments() {
    let oracle = decision(
        r#"if [ "$#" = 4 ] && [ "$1" = black ] && [ "${#2}" = 64 ] && [ "$3" = e7e5 ]; then
            echo "  $4"
            echo "searched 2 moves"
        else
            echo wrong
        fi"#,
    );
    let moves = [String::from("e7e5"), String::from("d7d5")];

    let choice = oracle
        .choose_move(Color::Black, &Board::new().to_compact(), &moves)
        .unwrap();
    assert_eq!(choice.as_deref(), Some("d7d5"));
}

#[test]
fn test_decision_silence() {
    let oracle = decision("true");
    let moves = [String::from("e2e4")];

    let choice = oracle
        .choose_move(Color::White, &Board::new().to_compact(), &moves)
        .unwrap();
    assert_eq!(choice, None);
}

#[test]
fn test_decision_without_moves_starts_nothing() {
    let oracle = SubprocessDecision::new(OracleCommand::new("/nonexistent/decision-oracle"));

    let choice = oracle
        .choose_move(Color::White, &Board::new().to_compact(), &[])
        .unwrap();
    assert_eq!(choice, None);
}

#[test]
fn test_session_with_process_oracles() {
    let oracle = rules(
        r#"case "$1" in
            *"legal_move(Board, white, 2, 5, 4, 5)"*) echo SUCCESS ;;
            *"all_legal_moves(Board, black"*) echo "[move(7,5,5,5)]" ;;
            *) echo FAILURE ;;
        esac"#,
    );
    let mut session = Session::new(oracle);

    assert_eq!(
        session.submit(mv("e2e3"), &mut ()),
        Err(SessionError::IllegalMove(mv("e2e3")))
    );
    assert_eq!(
        session.submit(mv("e2e4"), &mut ()),
        Ok(PlyOutcome::Moved(mv("e2e4")))
    );
    assert_eq!(session.state(), SessionState::AwaitingMove(Color::Black));

    let reply = decision(r#"echo "$3""#);
    let mut black = OraclePlayer::new(reply, "black (ai)");
    let turn = Turn {
        board: session.board(),
        side: Color::Black,
        rules: session.rules(),
    };
    assert_eq!(black.request_move(&turn), Candidate::Play(mv("e7e5")));
}
