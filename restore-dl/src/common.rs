pub use crate::error::{Error, Result};
pub use getset::{CopyGetters, Getters};
pub use itertools::{izip, Itertools as _};
pub use log::{debug, info, trace, warn};
pub use ndarray::{s, Array3, Array4, ArrayView3, Axis};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng, seq::SliceRandom};
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashSet, VecDeque},
    fmt,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
