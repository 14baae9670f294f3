//! Charts module - chart models, interactive plotting and static rendering

mod model;
mod plotter;
mod renderer;

pub use model::{
    AreaChart, BarChart, Bubble, BubbleChart, ChartData, LineChart, Measure, PieChart, PieSlice,
    Series, StackedLayer, TrendCharts, BUBBLE_SIZE_MAX,
};
pub use plotter::{ChartPlotter, BAR_COLOR, PALETTE};
pub use renderer::{ChartRenderer, RenderError};
