use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};
use strum::IntoEnumIterator;

use crate::aggregate::{
    Laterality, MilestoneBucket, Partner, PlayerReport, PositionEntry, RoleBreakdown,
    TurnoverSummary, ZoneGrid,
};
use crate::contribution::Role;
use crate::ranking::{LeaderboardEntry, Metric, Ranking};
use crate::zone::{Zone, COLS, ROWS};

fn label_col() -> Col {
    Col::new(Styles::default().with(MinWidth(10)).with(Left))
}

fn number_col(width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(width)).with(HAlign::Right))
}

fn header(cells: &[&str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        cells.iter().map(|&cell| Cell::from(cell)).collect(),
    )
}

pub fn tabulate_roles(report: &PlayerReport) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(),
            number_col(6),
            number_col(8),
            number_col(8),
            number_col(8),
            number_col(8),
        ])
        .with_row(header(&["Role", "Count", "PxT", "Count/90", "PxT/90", "PxT/act"]));
    for role in Role::iter() {
        let total = report.total(role);
        table.push_row(Row::new(
            Styles::default(),
            vec![
                role.to_string().into(),
                format!("{}", total.count).into(),
                format!("{:.3}", total.value).into(),
                format!("{:.2}", report.count_per_90(role)).into(),
                format!("{:.3}", report.value_per_90(role)).into(),
                format!("{:.3}", report.value_per_action(role)).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_breakdown(breakdown: &RoleBreakdown) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(),
            number_col(6),
            number_col(8),
            Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(6))
                    .with(HAlign::Right),
            ),
            number_col(8),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "".into(),
                "Lateral".into(),
                "".into(),
                "Central".into(),
                "".into(),
            ],
        ))
        .with_row(header(&["Milestone", "Count", "PxT", "Count", "PxT"]));
    for bucket in MilestoneBucket::iter() {
        let split = breakdown.bucket(bucket);
        let mut row_cells = vec![bucket.to_string().into()];
        for laterality in Laterality::iter() {
            row_cells.push(format!("{}", split[laterality].count).into());
            row_cells.push(format!("{:.3}", split[laterality].value).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_positions(positions: &[PositionEntry], role: Role) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(),
            number_col(7),
            number_col(6),
            number_col(8),
            number_col(8),
        ])
        .with_row(header(&["Position", "Minutes", "Count", "PxT", "PxT/90"]));
    for entry in positions {
        let total = &entry.roles[role].total;
        table.push_row(Row::new(
            Styles::default(),
            vec![
                entry.position.clone().into(),
                format!("{}", entry.minutes).into(),
                format!("{}", total.count).into(),
                format!("{:.3}", total.value).into(),
                format!("{:.3}", entry.value_per_90(role)).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_partners(partners: &[Partner]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![label_col(), number_col(6), number_col(8)])
        .with_row(header(&["Player", "Passes", "PxT"]));
    for partner in partners {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                partner.player_id.clone().into(),
                format!("{}", partner.tally.count).into(),
                format!("{:.3}", partner.tally.value).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_turnovers(report: &PlayerReport) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(),
            number_col(6),
            number_col(8),
            number_col(10),
            number_col(10),
            number_col(10),
            number_col(10),
        ])
        .with_row(header(&[
            "",
            "Count",
            "Count/90",
            "xT defense",
            "xT attack",
            "Behind",
            "Opp behind",
        ]));
    let mut push = |label: &str, summary: &TurnoverSummary| {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                label.into(),
                format!("{}", summary.count).into(),
                format!("{:.2}", summary.count_per_90(report.minutes)).into(),
                format!("{:.3}", summary.defense_xt).into(),
                format!("{:.3}", summary.attack_xt).into(),
                format!("{:.1}", summary.players_behind_ball.mean()).into(),
                format!("{:.1}", summary.opponents_behind_ball.mean()).into(),
            ],
        ));
    };
    push("Regains", &report.regains);
    push("Losses", &report.losses);
    table
}

/// The grid laid out as the pitch: one row per letter, one column per number.
pub fn tabulate_grid(grid: &ZoneGrid, precision: usize) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(3))
                    .with(HAlign::Centred),
            )];
            for _ in 0..COLS {
                cols.push(number_col(precision + 3));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["".into()];
            for col in 0..COLS {
                header_cells.push(format!("{}", col + 1).into());
            }
            Row::new(Styles::default().with(Header(true)), header_cells)
        });
    for row in 0..ROWS {
        let mut row_cells = vec![];
        for col in 0..COLS {
            let Some(zone) = Zone::from_coords(row, col) else {
                continue;
            };
            if col == 0 {
                row_cells.push(zone.row_letter().to_string().into());
            }
            row_cells.push(format!("{:.precision$}", grid[zone]).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_ranking(ranking: &Ranking) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            label_col(),
            Col::new(Styles::default().with(MinWidth(14)).with(Left)),
            number_col(8),
            number_col(8),
            number_col(10),
            number_col(10),
        ])
        .with_row(header(&[
            "Role",
            "Metric",
            "Value",
            "Rank",
            "Percentile",
            "Team share",
        ]));
    for role in Role::iter() {
        for metric in Metric::iter() {
            let standing = ranking.standing(role, metric);
            table.push_row(Row::new(
                Styles::default(),
                vec![
                    role.to_string().into(),
                    metric.to_string().into(),
                    format!("{:.3}", standing.value).into(),
                    format!("{}/{}", standing.rank, standing.total_players).into(),
                    format!("{:.1}", standing.percentile).into(),
                    format!("{:.1}%", standing.team_share).into(),
                ],
            ));
        }
    }
    table
}

pub fn tabulate_leaderboard(entries: &[LeaderboardEntry], metric: Metric) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            number_col(4),
            label_col(),
            number_col(7),
            number_col(6),
            number_col(8),
            number_col(14),
        ])
        .with_row(header(&[
            "Rank",
            "Player",
            "Minutes",
            "Count",
            "PxT",
            &metric.to_string(),
        ]));
    for entry in entries {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", entry.rank).into(),
                entry.player_id.clone().into(),
                format!("{}", entry.minutes).into(),
                format!("{}", entry.tally.count).into(),
                format!("{:.3}", entry.tally.value).into(),
                format!("{:.3}", entry.value).into(),
            ],
        ));
    }
    table
}
