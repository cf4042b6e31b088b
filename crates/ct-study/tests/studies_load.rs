use std::path::PathBuf;

#[test]
fn bundled_studies_load_and_validate() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let studies = ["studies/feeder_protection.yaml"];

    for rel in studies {
        let path = root.join(rel);
        let result = ct_study::load(&path);
        assert!(
            result.is_ok(),
            "study failed validation: {} => {:?}",
            path.display(),
            result.err()
        );
        let study = result.unwrap();
        assert_eq!(study.cases.len(), 3);
        assert!(study.case("reference").is_some());
    }
}
