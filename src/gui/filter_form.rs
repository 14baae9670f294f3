//! Filter Form Widget
//! Product and year multi-selects; changes apply only on submit.

use crate::dashboard::FilterOptions;
use crate::data::FilterSelection;
use egui::{RichText, ScrollArea};

pub struct FilterForm {
    products: Vec<(String, bool)>,
    years: Vec<(i32, bool)>,
}

impl FilterForm {
    /// Every option starts selected.
    pub fn new(options: &FilterOptions) -> Self {
        Self {
            products: options.products.iter().map(|p| (p.clone(), true)).collect(),
            years: options.years.iter().map(|&y| (y, true)).collect(),
        }
    }

    /// Current (possibly unsubmitted) selection.
    pub fn selection(&self) -> FilterSelection {
        FilterSelection::new(
            self.products
                .iter()
                .filter(|(_, on)| *on)
                .map(|(p, _)| p.clone()),
            self.years.iter().filter(|(_, on)| *on).map(|(y, _)| *y),
        )
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> FilterFormAction {
        let mut action = FilterFormAction::None;

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new("Select Product(s):").strong());
                        for (product, on) in &mut self.products {
                            ui.checkbox(on, product.as_str());
                        }
                        Self::bulk_buttons(ui, self.products.iter_mut().map(|(_, on)| on));
                    });

                    ui.add_space(30.0);

                    ui.vertical(|ui| {
                        ui.label(RichText::new("Select Year(s):").strong());
                        ScrollArea::vertical()
                            .id_salt("year_filter")
                            .max_height(140.0)
                            .show(ui, |ui| {
                                for (year, on) in &mut self.years {
                                    ui.checkbox(on, year.to_string());
                                }
                            });
                        Self::bulk_buttons(ui, self.years.iter_mut().map(|(_, on)| on));
                    });
                });

                ui.add_space(8.0);
                let button = egui::Button::new(RichText::new("▶ Apply Filters").size(15.0))
                    .min_size(egui::vec2(160.0, 30.0));
                if ui.add(button).clicked() {
                    action = FilterFormAction::Apply;
                }
            });

        action
    }

    fn bulk_buttons<'a>(ui: &mut egui::Ui, flags: impl Iterator<Item = &'a mut bool>) {
        let flags: Vec<&mut bool> = flags.collect();
        ui.horizontal(|ui| {
            let select_all = ui.small_button("Select All").clicked();
            let clear_all = ui.small_button("Clear All").clicked();
            if select_all || clear_all {
                for flag in flags {
                    *flag = select_all;
                }
            }
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterFormAction {
    None,
    Apply,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_form_selects_everything() {
        let form = FilterForm::new(&FilterOptions {
            products: vec!["Tea".into(), "Rubber".into()],
            years: vec![2020, 2021],
        });
        assert_eq!(
            form.selection(),
            FilterSelection::new(["Tea", "Rubber"], [2020, 2021])
        );
    }

    #[test]
    fn unchecked_options_drop_out_of_selection() {
        let mut form = FilterForm::new(&FilterOptions {
            products: vec!["Tea".into(), "Rubber".into()],
            years: vec![2020, 2021],
        });
        form.products[0].1 = false;
        form.years[1].1 = false;
        assert_eq!(form.selection(), FilterSelection::new(["Rubber"], [2020]));
    }
}
