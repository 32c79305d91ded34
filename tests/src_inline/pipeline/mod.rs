use super::*;
use crate::pipeline::stage4_emit::write_score_table;
use crate::test_support::MemorySource;

const TEAM_DATA: &str = "\
team,goals_per90,xg_per90,tackles,interceptions,possession,passes_pct,xg_net,xg_assist_per90,cards_yellow,fouls,avg_age
Argentina,2.14,2.1,15,8,54.3,85.1,0.9,1.5,3,12,27.9
France,2.0,1.8,14,9,51,84,0.5,1.2,2,11,26.5
Qatar,0.33,0.5,12,6,45,78,-1.2,0.3,1,14,28.1
Wales,0.33,0.4,-1,-1,41,80,-0.8,0.2,2,13,
";

fn player_source() -> MemorySource {
    MemorySource::new()
        .with(
            "player_stats.csv",
            "player,team,position,age,goals_per90,assists_per90,xg_per90,cards_yellow\n\
             Lionel Messi,Argentina,FW,35-178,0.9,0.45,0.7,1\n\
             Emiliano Martínez,Argentina,GK,30-086,0,0,0,1\n\
             Mehdi Taremi,IR Iran,FW,30-100,0.5,0.25,0.4,1\n\
             Enner Valencia,Ecuador,FW,33-040,1.1,0,0.6,0\n",
        )
        .with(
            "player_shooting.csv",
            "player,team,shots_on_target_per90\n\
             Lionel Messi,Argentina,1.2\n\
             Mehdi Taremi,Iran,0.8\n\
             Enner Valencia,Ecuador,1.0\n",
        )
        .with(
            "player_gca.csv",
            "player,team,gca_per90,sca_per90\n\
             Lionel Messi,Argentina,0.9,5.1\n\
             Mehdi Taremi,Iran,0.5,2.0\n\
             Enner Valencia,Ecuador,0.2,1.5\n",
        )
        .with(
            "player_passing.csv",
            "player,team,passes_pct,progressive_passes,passes_into_final_third\n\
             Lionel Messi,Argentina,83.1,30,25\n\
             Mehdi Taremi,Iran,70.2,5,4\n\
             Enner Valencia,Ecuador,68,3,2\n",
        )
        .with(
            "player_defense.csv",
            "player,team,tackles,interceptions,clearances,blocks\n\
             Lionel Messi,Argentina,2,1,0,3\n\
             Mehdi Taremi,Iran,3,2,4,2\n\
             Enner Valencia,Ecuador,-1,-1,-1,-1\n",
        )
        .with(
            "player_misc.csv",
            "player,team,fouls,aerials_won_pct\n\
             Lionel Messi,Argentina,5,20\n\
             Mehdi Taremi,Iran,8,55.6\n\
             Enner Valencia,Ecuador,6,40\n",
        )
}

fn render(out: &PipelineOutput) -> Vec<u8> {
    let mut buf = Vec::new();
    write_score_table(&mut buf, out.kind, &out.keys, &out.scores).unwrap();
    buf
}

#[test]
fn test_team_pipeline_end_to_end() {
    let source = MemorySource::new().with("team_data_clean.csv", TEAM_DATA);
    let out = run_pipeline(
        &PipelineSpec::teams_v1(),
        &ScoringProfile::default_v1(),
        &source,
    )
    .unwrap();

    assert_eq!(
        out.keys,
        vec![
            EntityKey::team("Argentina"),
            EntityKey::team("France"),
            EntityKey::team("Qatar")
        ]
    );
    assert_eq!(out.dropped, vec![EntityKey::team("Wales")]);

    let offensive = out.scores.category("Offensive").unwrap();
    assert_eq!(offensive[0], Some(10.0));
    assert_eq!(offensive[2], Some(1.0));
    for col in &out.scores.values {
        assert_eq!(col.len(), 3);
        assert!(col.iter().all(|v| v.is_some_and(|s| (1.0..=10.0).contains(&s))));
    }
}

#[test]
fn test_player_pipeline_end_to_end() {
    let out = run_pipeline(
        &PipelineSpec::players_v1(),
        &ScoringProfile::default_v1(),
        &player_source(),
    )
    .unwrap();

    assert_eq!(
        out.keys,
        vec![
            EntityKey::player("Lionel Messi", "Argentina"),
            EntityKey::player("Mehdi Taremi", "Iran"),
        ]
    );
    assert_eq!(
        out.dropped,
        vec![EntityKey::player("Enner Valencia", "Ecuador")]
    );
    assert_eq!(out.load.rows_excluded, 1);
    assert_eq!(out.load.missing_auxiliary, vec!["player_possession.csv"]);

    assert_eq!(
        out.scores.category("Scoring Threat").unwrap(),
        &[Some(10.0), Some(1.0)]
    );
    assert_eq!(
        out.scores.category("Build-up Play").unwrap(),
        &[Some(10.0), Some(1.0)]
    );
    assert_eq!(
        out.scores.category("Defensive Workrate").unwrap(),
        &[Some(3.25), Some(7.75)]
    );
    assert_eq!(
        out.scores.category("Discipline & Physical").unwrap(),
        &[Some(4.375), Some(6.625)]
    );

    let touches = out.scores.audits.iter().find(|a| a.metric == "touches").unwrap();
    assert_eq!(touches.observed, 0);
    let cards = out
        .scores
        .audits
        .iter()
        .find(|a| a.metric == "cards_yellow")
        .unwrap();
    assert!(cards.degenerate);
}

#[test]
fn test_identical_input_gives_identical_bytes() {
    let spec = PipelineSpec::players_v1();
    let profile = ScoringProfile::default_v1();
    let first = render(&run_pipeline(&spec, &profile, &player_source()).unwrap());
    let second = render(&run_pipeline(&spec, &profile, &player_source()).unwrap());
    assert_eq!(first, second);
    assert!(
        String::from_utf8(first)
            .unwrap()
            .starts_with("player,team,Scoring Threat,Chance Creation,")
    );
}

#[test]
fn test_everyone_dropped_emits_header_only() {
    let source = MemorySource::new().with("team_data_clean.csv", "team,goals_per90\nSpain,1.2\n");
    let out = run_pipeline(
        &PipelineSpec::teams_v1(),
        &ScoringProfile::default_v1(),
        &source,
    )
    .unwrap();
    assert!(out.keys.is_empty());
    assert_eq!(
        String::from_utf8(render(&out)).unwrap(),
        "team,Offensive,Defensive,Cohesion,Efficiency,Discipline\n"
    );
}

#[test]
fn test_missing_primary_aborts() {
    let err = run_pipeline(
        &PipelineSpec::teams_v1(),
        &ScoringProfile::default_v1(),
        &MemorySource::new(),
    )
    .unwrap_err();
    assert!(matches!(err, InputError::MissingPrimary { .. }));
}

#[test]
fn test_threshold_from_profile_is_used() {
    let mut profile = ScoringProfile::default_v1();
    profile.completeness_threshold = 0.5;
    let source = MemorySource::new().with("team_data_clean.csv", TEAM_DATA);
    let out = run_pipeline(&PipelineSpec::teams_v1(), &profile, &source).unwrap();
    assert_eq!(out.keys.len(), 4);
    assert_eq!(out.threshold, 0.5);
}
