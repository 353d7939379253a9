//! Importing XGBoost JSON dumps and predicting with the resulting ensemble.

use domtree::compat::{addtree_from_xgb_dump, XgbImportConfig};
use domtree::AddTree;
use tracing_subscriber::EnvFilter;

const DUMPS: [&str; 2] = [
    r#"{"nodeid":0,"depth":0,"split":"f0","split_condition":0.5,"yes":1,"no":2,"missing":1,
        "children":[
          {"nodeid":1,"depth":1,"split":"f1","split_condition":1.5,"yes":3,"no":4,"missing":3,
           "children":[{"nodeid":3,"leaf":0.4},{"nodeid":4,"leaf":-0.1}]},
          {"nodeid":2,"leaf":-0.3}]}"#,
    r#"{"nodeid":0,"depth":0,"split":"f1","split_condition":0.75,"yes":1,"no":2,"missing":1,
        "children":[{"nodeid":1,"leaf":0.2},{"nodeid":2,"leaf":-0.2}]}"#,
];

fn main() -> domtree::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addtree = addtree_from_xgb_dump(DUMPS, &XgbImportConfig::default())?;
    println!(
        "Imported {} trees over {} features",
        addtree.len(),
        addtree.num_features()
    );

    let examples = vec![vec![0.1, 0.5], vec![0.1, 2.0], vec![0.9, 1.0]];
    for (example, pred) in examples.iter().zip(addtree.predict(&examples)?) {
        println!("  f({example:?}) = {pred:.3}");
    }

    let json = addtree.to_json()?;
    let decoded = AddTree::from_json(&json)?;
    println!("JSON round trip preserved the ensemble: {}", decoded == addtree);
    Ok(())
}
