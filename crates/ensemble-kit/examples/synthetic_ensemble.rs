use std::sync::Arc;

use ensemble_kit::config::{Kernel, SplitConfig};
use ensemble_kit::data_handling::{Dataset, Example};
use ensemble_kit::metrics::accuracy;
use ensemble_kit::models::ensemble::WeightedEnsemble;
use ensemble_kit::models::gradient_boosting::{BoostingParams, GradientBoosting};
use ensemble_kit::models::random_forest::{ForestParams, RandomForest};
use ensemble_kit::models::svm::{MarginClassifier, SvmParams};
use ensemble_kit::split::split_dataset;

fn main() -> ensemble_kit::Result<()> {
    env_logger::init();

    // 100 points on a grid, label 1 above the anti-diagonal
    let examples = (0..100)
        .map(|i| {
            let x0 = (i % 10) as f64 / 9.0;
            let x1 = (i / 10) as f64 / 9.0;
            let label = if x0 + x1 > 1.0 { 1.0 } else { 0.0 };
            Example::new(vec![x0, x1], label)
        })
        .collect();
    let dataset = Dataset::new(examples)?;

    let split = split_dataset(&dataset, &SplitConfig::default().stratified(true));
    println!("Split sizes: {:?}", split.sizes());

    let x = split.train.feature_matrix();
    let y = split.train.numeric_labels()?;

    let forest = RandomForest::fit(
        &x,
        &y,
        &ForestParams {
            seed: Some(7),
            ..ForestParams::default()
        },
    )?;
    let boosting = GradientBoosting::fit(&x, &y, &BoostingParams::default())?;
    let margin = MarginClassifier::fit(&x, &y, &SvmParams::with_kernel(Kernel::Rbf))?;
    println!("Support vectors kept: {}", margin.support_vectors().len());

    let ensemble = WeightedEnsemble::new()
        .with_model(Arc::new(forest), 2.0)?
        .with_model(Arc::new(boosting), 1.0)?;

    let x_test = split.test.feature_matrix();
    let y_test = split.test.numeric_labels()?;
    let scores = ensemble.predict(&x_test)?;
    let classes: Vec<f64> = scores.iter().map(|s| if *s > 0.5 { 1.0 } else { 0.0 }).collect();
    println!("Ensemble test accuracy: {:.3}", accuracy(&y_test, &classes)?);

    let margin_classes: Vec<f64> = x_test
        .rows()
        .map(|row| if margin.predict_class(row) > 0.0 { 1.0 } else { 0.0 })
        .collect();
    println!("Margin classifier test accuracy: {:.3}", accuracy(&y_test, &margin_classes)?);
    println!("First test scores: {:?}", &scores[..scores.len().min(5)]);
    Ok(())
}
