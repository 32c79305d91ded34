use super::*;
use crate::model::categories::CategorySet;
use crate::model::profile::ExclusionRule;
use crate::test_support::MemorySource;

const STATS: &str = "\
player,team,position,age,goals_per90
Lionel Messi,Argentina,FW,35-178,0.9
Emiliano Martínez,Argentina,GK,30-086,0
Mehdi Taremi,IR Iran,FW,30-100,0.5
Enner Valencia,Ecuador,FW,33-040,
";

const SHOOTING: &str = "\
player,team,shots_on_target_per90
Mehdi Taremi,Iran,0.8
Lionel Messi,Argentina,1.2
Lionel Messi,Argentina,9.9
";

fn spec() -> PipelineSpec {
    PipelineSpec {
        kind: EntityKind::Player,
        primary_file: "stats.csv".to_string(),
        primary_columns: vec!["age".to_string(), "goals_per90".to_string()],
        auxiliary: vec![
            AuxTableSpec {
                file: "shooting.csv".to_string(),
                columns: vec!["shots_on_target_per90".to_string()],
            },
            AuxTableSpec {
                file: "defense.csv".to_string(),
                columns: vec!["tackles".to_string(), "blocks".to_string()],
            },
        ],
        exclude: Some(ExclusionRule {
            column: "position".to_string(),
            values: vec!["GK".to_string()],
        }),
        age_columns: vec!["age".to_string()],
        categories: CategorySet::default(),
        output_file: "out.csv".to_string(),
    }
}

fn cells<'a>(joined: &'a JoinedTable, column: &str) -> Vec<&'a str> {
    joined
        .column(column)
        .unwrap()
        .cells
        .iter()
        .map(String::as_str)
        .collect()
}

#[test]
fn test_left_join_keeps_every_primary_entity() {
    let source = MemorySource::new()
        .with("stats.csv", STATS)
        .with("shooting.csv", SHOOTING);
    let out = run_stage1(&spec(), &ScoringProfile::default_v1(), &source).unwrap();
    let joined = &out.joined;

    assert_eq!(
        joined.keys,
        vec![
            EntityKey::player("Lionel Messi", "Argentina"),
            EntityKey::player("Mehdi Taremi", "Iran"),
            EntityKey::player("Enner Valencia", "Ecuador"),
        ]
    );
    assert_eq!(cells(joined, "age"), vec!["35", "30", "33"]);
    assert_eq!(cells(joined, "goals_per90"), vec!["0.9", "0.5", ""]);
    assert_eq!(cells(joined, "shots_on_target_per90"), vec!["1.2", "0.8", ""]);
    assert_eq!(cells(joined, "tackles"), vec!["", "", ""]);
    assert_eq!(cells(joined, "blocks"), vec!["", "", ""]);

    assert_eq!(out.report.rows_loaded, 4);
    assert_eq!(out.report.rows_excluded, 1);
    assert_eq!(out.report.missing_auxiliary, vec!["defense.csv"]);
    assert_eq!(out.report.duplicate_auxiliary_keys, 1);
}

#[test]
fn test_missing_primary_is_fatal() {
    let source = MemorySource::new().with("shooting.csv", SHOOTING);
    let err = run_stage1(&spec(), &ScoringProfile::default_v1(), &source).unwrap_err();
    match err {
        InputError::MissingPrimary { path } => assert!(path.ends_with("stats.csv")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_primary_without_identity_is_fatal() {
    let source = MemorySource::new().with("stats.csv", "team,goals_per90\nSpain,1\n");
    let err = run_stage1(&spec(), &ScoringProfile::default_v1(), &source).unwrap_err();
    assert!(matches!(err, InputError::MissingColumn { ref column, .. } if column == "player"));
}

#[test]
fn test_auxiliary_without_key_degrades() {
    let source = MemorySource::new()
        .with("stats.csv", STATS)
        .with("shooting.csv", "name,shots_on_target_per90\nLionel Messi,1.2\n");
    let out = run_stage1(&spec(), &ScoringProfile::default_v1(), &source).unwrap();
    assert_eq!(cells(&out.joined, "shots_on_target_per90"), vec!["", "", ""]);
    assert_eq!(
        out.report.missing_auxiliary,
        vec!["shooting.csv", "defense.csv"]
    );
}

#[test]
fn test_missing_columns_are_reported() {
    let source = MemorySource::new()
        .with("stats.csv", "player,team,position\nPedri,Spain,MF\n")
        .with("shooting.csv", "player,team\nPedri,Spain\n");
    let out = run_stage1(&spec(), &ScoringProfile::default_v1(), &source).unwrap();
    assert_eq!(
        out.report.missing_columns,
        vec![
            "stats.csv:age",
            "stats.csv:goals_per90",
            "shooting.csv:shots_on_target_per90"
        ]
    );
    assert_eq!(cells(&out.joined, "goals_per90"), vec![""]);
}

#[test]
fn test_no_exclusion_column_keeps_all_rows() {
    let source = MemorySource::new().with(
        "stats.csv",
        "player,team,age,goals_per90\nPedri,Spain,19-361,0.2\nGavi,Spain,18-110,0.3\n",
    );
    let out = run_stage1(&spec(), &ScoringProfile::default_v1(), &source).unwrap();
    assert_eq!(out.report.rows_excluded, 0);
    assert_eq!(out.joined.n_entities(), 2);
}

#[test]
fn test_team_kind_keys_by_team_only() {
    let mut team_spec = spec();
    team_spec.kind = EntityKind::Team;
    team_spec.exclude = None;
    team_spec.age_columns.clear();
    team_spec.primary_columns = vec!["possession".to_string()];
    team_spec.auxiliary = vec![AuxTableSpec {
        file: "extra.csv".to_string(),
        columns: vec!["fouls".to_string()],
    }];
    let source = MemorySource::new()
        .with("stats.csv", "team,possession\nIR Iran,38.5\nWales,41\n")
        .with("extra.csv", "team,fouls\nWales,12\nIran,14\n");
    let out = run_stage1(&team_spec, &ScoringProfile::default_v1(), &source).unwrap();
    assert_eq!(
        out.joined.keys,
        vec![EntityKey::team("Iran"), EntityKey::team("Wales")]
    );
    assert_eq!(cells(&out.joined, "fouls"), vec!["14", "12"]);
}

#[test]
fn test_repeated_column_keeps_first() {
    let mut dup_spec = spec();
    dup_spec.auxiliary = vec![AuxTableSpec {
        file: "shooting.csv".to_string(),
        columns: vec!["goals_per90".to_string()],
    }];
    let source = MemorySource::new()
        .with("stats.csv", STATS)
        .with("shooting.csv", "player,team,goals_per90\nLionel Messi,Argentina,7\n");
    let out = run_stage1(&dup_spec, &ScoringProfile::default_v1(), &source).unwrap();
    assert_eq!(cells(&out.joined, "goals_per90"), vec!["0.9", "0.5", ""]);
}
