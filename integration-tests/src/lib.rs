pub mod benchmarks {
    use std::f64::consts::PI;

    use skein_core::Objective;

    /// `f(x) = Σ xᵢ²`, minimum 0 at the origin.
    pub fn sphere(dimension: usize) -> Objective {
        Objective::new(dimension, |x| x.iter().map(|v| v * v).sum()).unwrap()
    }

    /// `f(x) = Σ 10^(6i/(N-1)) xᵢ²`, minimum 0 at the origin.
    pub fn ellipsoid(dimension: usize) -> Objective {
        let scales: Vec<f64> = (0..dimension)
            .map(|i| {
                let exponent = if dimension > 1 {
                    6.0 * i as f64 / (dimension - 1) as f64
                } else {
                    0.0
                };
                10_f64.powf(exponent)
            })
            .collect();

        Objective::new(dimension, move |x| {
            x.iter().zip(&scales).map(|(v, scale)| scale * v * v).sum()
        })
        .unwrap()
    }

    /// The Rosenbrock valley, minimum 0 at `(1, …, 1)`.
    pub fn rosenbrock(dimension: usize) -> Objective {
        Objective::new(dimension, |x| {
            x.windows(2)
                .map(|pair| 100.0 * (pair[1] - pair[0] * pair[0]).powi(2) + (1.0 - pair[0]).powi(2))
                .sum()
        })
        .unwrap()
    }

    /// The Rastrigin function, minimum 0 at the origin with many local minima.
    pub fn rastrigin(dimension: usize) -> Objective {
        Objective::new(dimension, |x| {
            10.0 * x.len() as f64
                + x.iter()
                    .map(|v| v * v - 10.0 * (2.0 * PI * v).cos())
                    .sum::<f64>()
        })
        .unwrap()
    }
}

pub mod run {
    use serde::{Deserialize, Serialize};
    use skein_core::Objective;
    use skein_solvers::{
        cmaes::{self, CmaEs},
        evaluation::{Evaluator, Policy},
        optimizer::{Optimizer, Termination},
    };

    /// A complete CMA-ES run description, as loaded from a config file.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RunConfig {
        pub initial_mean: Vec<f64>,

        #[serde(default)]
        pub cmaes: cmaes::Config,

        #[serde(default)]
        pub termination: Termination,

        #[serde(default)]
        pub evaluation: Policy,
    }

    impl RunConfig {
        /// Assembles an optimizer for `objective` from this config.
        pub fn optimizer(
            &self,
            objective: Objective,
        ) -> Result<Optimizer<CmaEs>, Box<dyn std::error::Error>> {
            let strategy = CmaEs::new(&objective, &self.initial_mean, &self.cmaes)?;
            let evaluator = Evaluator::new(objective, self.evaluation);
            Ok(Optimizer::new(evaluator, strategy)?.with_termination(self.termination))
        }
    }
}
