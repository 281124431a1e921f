use super::*;
use crate::services::catalog::filter::Field;

fn render(predicate: &Predicate) -> String {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM cards WHERE ");
    push_predicate(&mut builder, predicate);
    builder.sql().to_string()
}

#[test]
fn test_escape_like() {
    assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    assert_eq!(escape_like("plain"), "plain");
}

#[test]
fn test_render_binds_values() {
    let sql = render(&Predicate::all(vec![
        Predicate::contains(Field::NameSearch, "magician"),
        Predicate::equals_ignore_case(Field::Race, "Spellcaster"),
    ]));
    assert_eq!(
        sql,
        "SELECT id FROM cards WHERE ((COALESCE(name_search, '') LIKE ? ESCAPE '\\') AND \
         (LOWER(COALESCE(race, '')) = LOWER(?)))"
    );
    assert!(!sql.contains("magician"));
    assert!(!sql.contains("Spellcaster"));
}

#[test]
fn test_render_range_and_not() {
    let range = Predicate::range(Field::Atk, Some(1000), None).unwrap();
    assert_eq!(
        render(&range),
        "SELECT id FROM cards WHERE (atk IS NOT NULL AND atk >= ?)"
    );

    let not = Predicate::negate(Predicate::contains(Field::FrameType, "xyz"));
    assert_eq!(
        render(&not),
        "SELECT id FROM cards WHERE NOT (COALESCE(frame_type, '') LIKE ? ESCAPE '\\')"
    );
}

#[test]
fn test_render_trivial_predicates() {
    assert_eq!(render(&Predicate::True), "SELECT id FROM cards WHERE 1 = 1");
    assert_eq!(render(&Predicate::Or(vec![])), "SELECT id FROM cards WHERE 1 = 0");
}
