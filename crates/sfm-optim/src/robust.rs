//! Robust losses applied per residual block.

use anyhow::{ensure, Result};
use tiny_solver::loss_functions::{ArctanLoss, CauchyLoss, HuberLoss, Loss};

/// Robust loss attached to every observation's residual block.
///
/// Per-observation robustification comes from using one residual block per
/// observation; the loss downweights outlying observations without
/// removing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RobustLoss {
    /// Pure L2, no robustness.
    None,
    Huber { scale: f64 },
    Cauchy { scale: f64 },
    Arctan { scale: f64 },
}

impl Default for RobustLoss {
    /// Cauchy with unit scale, the kernel the refinement step has always
    /// applied.
    fn default() -> Self {
        RobustLoss::Cauchy { scale: 1.0 }
    }
}

impl RobustLoss {
    /// Compile into a tiny-solver loss object (`None` for plain L2).
    pub fn to_tiny_loss(self) -> Result<Option<Box<dyn Loss + Send>>> {
        match self {
            RobustLoss::None => Ok(None),
            RobustLoss::Huber { scale } => {
                ensure!(scale > 0.0, "Huber scale must be positive");
                Ok(Some(Box::new(HuberLoss::new(scale))))
            }
            RobustLoss::Cauchy { scale } => {
                ensure!(scale > 0.0, "Cauchy scale must be positive");
                Ok(Some(Box::new(CauchyLoss::new(scale))))
            }
            RobustLoss::Arctan { scale } => {
                ensure!(scale > 0.0, "Arctan scale must be positive");
                Ok(Some(Box::new(ArctanLoss::new(scale))))
            }
        }
    }
}
