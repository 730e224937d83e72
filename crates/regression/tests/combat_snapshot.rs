use regression::minimum_roll_combat_log;

#[test]
fn minimum_roll_fight() {
    let trace = minimum_roll_combat_log();
    insta::assert_json_snapshot!("minimum_roll_fight", trace);
}
