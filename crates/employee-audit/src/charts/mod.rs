//! Chart rendering module.
//!
//! Draws the descriptive charts of the cleaned dataset as SVG files with
//! plotters. Each [`ChartKind`] names one output file and describes how it
//! is drawn through [`ChartSpec`].

mod render;

pub use render::ChartRenderer;

use serde::{Deserialize, Serialize};

/// The charts written by a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    SalaryVsAge,
    DaysServiceVsVacation,
    SalaryDistribution,
    GenderSalaryDistribution,
    GenderPerformanceDistribution,
    PerformanceDistribution,
    DepartmentDistribution,
    GenderDistribution,
    EducationDistribution,
    CityDistribution,
    StateDistribution,
    EmployeeLevelDistribution,
    WorkLocationDistribution,
    ShiftDistribution,
    StatusDistribution,
}

/// How a chart is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartSpec {
    /// Points of `x` against `y`, one colour per `group`.
    Scatter {
        x: &'static str,
        y: &'static str,
        group: &'static str,
        x_label: &'static str,
        y_label: &'static str,
    },
    /// Frequency histogram of one numeric column.
    Histogram {
        column: &'static str,
        x_label: &'static str,
        color: (u8, u8, u8),
    },
    /// One box per `group` over `value`.
    Boxplot {
        group: &'static str,
        value: &'static str,
        y_label: &'static str,
    },
    /// Counts per category, most frequent first. `top` limits the bars.
    Bar {
        column: &'static str,
        x_label: &'static str,
        top: bool,
    },
    /// Share of each category.
    Pie { column: &'static str },
}

impl ChartKind {
    /// Every chart, in rendering order.
    pub const ALL: [ChartKind; 15] = [
        ChartKind::SalaryVsAge,
        ChartKind::DaysServiceVsVacation,
        ChartKind::SalaryDistribution,
        ChartKind::GenderSalaryDistribution,
        ChartKind::GenderPerformanceDistribution,
        ChartKind::PerformanceDistribution,
        ChartKind::DepartmentDistribution,
        ChartKind::GenderDistribution,
        ChartKind::EducationDistribution,
        ChartKind::CityDistribution,
        ChartKind::StateDistribution,
        ChartKind::EmployeeLevelDistribution,
        ChartKind::WorkLocationDistribution,
        ChartKind::ShiftDistribution,
        ChartKind::StatusDistribution,
    ];

    /// Output file name without extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::SalaryVsAge => "salary_vs_age",
            Self::DaysServiceVsVacation => "days_service_vs_vacation",
            Self::SalaryDistribution => "salary_distribution",
            Self::GenderSalaryDistribution => "gender_salary_distribution",
            Self::GenderPerformanceDistribution => "gender_performance_distribution",
            Self::PerformanceDistribution => "performance_distribution",
            Self::DepartmentDistribution => "department_distribution",
            Self::GenderDistribution => "gender_distribution",
            Self::EducationDistribution => "education_distribution",
            Self::CityDistribution => "city_distribution",
            Self::StateDistribution => "state_distribution",
            Self::EmployeeLevelDistribution => "employee_level_distribution",
            Self::WorkLocationDistribution => "work_location_distribution",
            Self::ShiftDistribution => "shift_distribution",
            Self::StatusDistribution => "status_distribution",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.svg", self.file_stem())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::SalaryVsAge => "Salary vs. Age by Gender",
            Self::DaysServiceVsVacation => "Days of Service vs. Vacation Days by Employee Level",
            Self::SalaryDistribution => "Salary Distribution",
            Self::GenderSalaryDistribution => "Salary Distribution by Gender",
            Self::GenderPerformanceDistribution => "Performance Score Distribution by Gender",
            Self::PerformanceDistribution => "Performance Score Distribution",
            Self::DepartmentDistribution => "Distribution of Employees by Department",
            Self::GenderDistribution => "Distribution of Employees by Gender",
            Self::EducationDistribution => "Distribution of Employees by Education Level",
            Self::CityDistribution => "Distribution of Employees by City (Top 10)",
            Self::StateDistribution => "Distribution of Employees by State",
            Self::EmployeeLevelDistribution => "Distribution of Employees by Employee Level",
            Self::WorkLocationDistribution => "Distribution of Employees by Work Location",
            Self::ShiftDistribution => "Distribution of Employees by Shift",
            Self::StatusDistribution => "Distribution of Employees by Status",
        }
    }

    pub fn spec(&self) -> ChartSpec {
        match self {
            Self::SalaryVsAge => ChartSpec::Scatter {
                x: "age",
                y: "base_salary",
                group: "gender",
                x_label: "Age",
                y_label: "Base Salary ($)",
            },
            Self::DaysServiceVsVacation => ChartSpec::Scatter {
                x: "days_service",
                y: "vacation_days",
                group: "employee_level",
                x_label: "Days of Service",
                y_label: "Vacation Days",
            },
            Self::SalaryDistribution => ChartSpec::Histogram {
                column: "base_salary",
                x_label: "Base Salary ($)",
                color: (31, 119, 180),
            },
            Self::PerformanceDistribution => ChartSpec::Histogram {
                column: "performance_score",
                x_label: "Performance Score",
                color: (44, 160, 44),
            },
            Self::GenderSalaryDistribution => ChartSpec::Boxplot {
                group: "gender",
                value: "base_salary",
                y_label: "Base Salary ($)",
            },
            Self::GenderPerformanceDistribution => ChartSpec::Boxplot {
                group: "gender",
                value: "performance_score",
                y_label: "Performance Score",
            },
            Self::DepartmentDistribution => ChartSpec::Bar {
                column: "department",
                x_label: "Department",
                top: false,
            },
            Self::EducationDistribution => ChartSpec::Bar {
                column: "education",
                x_label: "Education Level",
                top: false,
            },
            Self::CityDistribution => ChartSpec::Bar {
                column: "city",
                x_label: "City",
                top: true,
            },
            Self::StateDistribution => ChartSpec::Bar {
                column: "state",
                x_label: "State",
                top: false,
            },
            Self::GenderDistribution => ChartSpec::Pie { column: "gender" },
            Self::EmployeeLevelDistribution => ChartSpec::Pie { column: "employee_level" },
            Self::WorkLocationDistribution => ChartSpec::Pie { column: "work_location" },
            Self::ShiftDistribution => ChartSpec::Pie { column: "shift" },
            Self::StatusDistribution => ChartSpec::Pie { column: "status" },
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}
