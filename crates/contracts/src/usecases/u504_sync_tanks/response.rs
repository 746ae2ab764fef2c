use serde::{Deserialize, Serialize};

use crate::domain::a005_tank::aggregate::TankLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSyncResult {
    pub actualizados: usize,
    pub tanques: Vec<TankLevel>,
}
