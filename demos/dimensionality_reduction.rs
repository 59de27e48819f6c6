use ndarray::array;
use tabular_reduce::{Lda, Matrix, Pca, ReductionError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Dimensionality Reduction: PCA vs LDA ===\n");

    let x = array![
        [1.0, 2.0, 3.0, 4.0, 5.0, 1.1, 2.1, 3.1],
        [2.0, 4.5, 6.0, 8.0, 10.0, 2.2, 4.2, 6.2],
        [3.0, 6.0, 9.5, 12.0, 15.0, 3.3, 6.3, 9.3],
        [1.5, 3.0, 4.5, 6.5, 7.5, 1.6, 3.1, 4.6],
        [10.0, 8.0, 6.0, 4.0, 2.5, 10.5, 8.5, 6.5],
        [12.0, 10.5, 8.0, 6.0, 4.0, 12.0, 10.5, 8.5],
        [14.0, 12.0, 10.0, 8.5, 6.0, 14.5, 12.5, 10.5],
        [11.0, 9.0, 7.5, 5.0, 3.0, 11.5, 9.5, 7.5],
        [20.0, 15.0, 10.0, 5.0, 0.0, 20.5, 15.5, 10.5],
        [25.0, 20.0, 15.0, 10.0, 5.0, 25.5, 20.5, 15.5]
    ];
    let y = ["a", "a", "a", "a", "b", "b", "b", "b", "c", "c"];

    println!("Original data shape: {} samples, {} features\n", x.nrows(), x.ncols());

    println!("=== Principal Component Analysis (PCA) ===");
    for &n_components in &[2, 3, 4] {
        match describe_pca(&x, n_components) {
            Ok(msg) => println!("{}", msg),
            Err(e) => println!("PCA with {} components failed: {}", n_components, e),
        }
    }

    println!("\n=== Linear Discriminant Analysis (LDA) ===");
    // 8 features against 10 samples: the within-class scatter cannot be full rank.
    match Lda::new(2).fit(&x, &y) {
        Ok(fit) => println!("LDA on all features: {:?}", fit.transformed.shape()),
        Err(e) => println!("LDA on all features failed: {}", e),
    }

    let reduced = Pca::new(3).transform(&x)?;
    match describe_lda(&reduced, &y) {
        Ok(msg) => println!("{}", msg),
        Err(e) => println!("LDA on PCA scores failed: {}", e),
    }

    println!("\n=== Reconstruction error in standardized space ===");
    println!("{:<12} {:>15}", "Components", "MSE");
    println!("{}", "-".repeat(28));
    for n_components in 1..=x.ncols() {
        let fit = Pca::new(n_components).fit(&x)?;
        let standardized = fit.scaler().transform(&x)?;
        let reconstructed = fit.reconstruct(&fit.transformed)?;
        let mse = (&standardized - &reconstructed).mapv(|v| v * v).mean().unwrap_or(f64::INFINITY);
        println!("{:<12} {:>15.6}", n_components, mse);
    }

    Ok(())
}

fn describe_pca(x: &Matrix, n_components: usize) -> Result<String, ReductionError> {
    let fit = Pca::new(n_components).fit(x)?;

    Ok(format!(
        "PCA({} components): output shape {:?}, explained variance: {:.4}",
        n_components,
        fit.transformed.shape(),
        fit.explained_variance_ratio.sum()
    ))
}

fn describe_lda(x: &Matrix, y: &[&str]) -> Result<String, ReductionError> {
    let fit = Lda::new(2).fit(x, y)?;
    let accuracy = fit.score(x, y)?;

    Ok(format!(
        "LDA on 3 PCA scores: output shape {:?}, explained variance: {:.4}, nearest-centroid accuracy: {:.4}",
        fit.transformed.shape(),
        fit.explained_variance_ratio.sum(),
        accuracy
    ))
}
