//! The pure state-transition engine.
//!
//! [`reduce`] applies exactly one command to one model and returns the
//! next model plus the optional outbound message. Deterministic per
//! `(command, model)` pair: renderer calls are effects on an external
//! collaborator, not hidden state, and every wrapper is invoked exactly
//! once. Validation failures leave the model untouched.

use crate::changes::{ModelChange, ModelChanger};
use crate::command::Command;
use crate::element::{Feature, InfoMessage, Layer, LayerGroup, Overlay};
use crate::message::{InternalSubMsg, KaartMsg};
use crate::model::{KaartModel, LayerEntry};
use crate::renderer::MapRenderer;
use crate::style::StyleSelector;
use crate::validation::{Validation, fail};

/// Apply one command to the model.
///
/// Returns the next model and, for wrapper-bearing commands, the
/// message the wrapper produced. Fire-and-forget commands return
/// `None`.
pub fn reduce<Msg: KaartMsg>(
    model: KaartModel,
    cmd: Command<Msg>,
    changer: &ModelChanger,
    renderer: &mut dyn MapRenderer,
) -> (KaartModel, Option<Msg>) {
    let _span = tracing::debug_span!("reduce", command = cmd.tag()).entered();
    let mut model = model;

    match cmd {
        Command::Subscribe { request, wrapper } => {
            let result = model.subscriptions.subscribe(
                request.kind,
                request.subscriber_name,
                request.listener,
            );
            // The ack also travels the internal bus, so listeners of
            // the Subscribed kind observe registrations as they happen.
            model.subscriptions.publish(&InternalSubMsg::Subscribed {
                result: Ok(result.clone()),
            });
            let msg = wrapper.wrap(Ok(result));
            (model, Some(msg))
        }

        Command::Unsubscribe { result } => {
            model.subscriptions.unsubscribe(&result);
            (model, None)
        }

        Command::AddLayer {
            position,
            layer,
            visible,
            group,
            wrapper,
        } => {
            let outcome = add_layer(&mut model, renderer, position, layer, visible, group);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::RemoveLayer { title, wrapper } => {
            let outcome = remove_layer(&mut model, renderer, &title);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::MoveLayer {
            title,
            to_position,
            wrapper,
        } => {
            let outcome = move_layer(&mut model, renderer, &title, to_position);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::ReplaceFeatures {
            title,
            features,
            wrapper,
        } => {
            let outcome = replace_features(&model, renderer, &title, &features);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::ShowLayer { title, wrapper } => {
            let outcome = set_layer_visible(&mut model, renderer, &title, true);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::HideLayer { title, wrapper } => {
            let outcome = set_layer_visible(&mut model, renderer, &title, false);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::SetLayerStyle {
            title,
            style,
            selection_style,
            wrapper,
        } => {
            let outcome = set_layer_style(&mut model, renderer, &title, style, selection_style);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::ChangeCenter { center } => {
            renderer.set_center(center);
            model.view.center = Some(center);
            changer.emit(ModelChange::CenterChanged { center });
            (model, None)
        }

        Command::ChangeZoom { zoom, wrapper } => {
            let outcome = change_zoom(&mut model, renderer, changer, zoom);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::ChangeExtent { extent } => {
            renderer.fit_extent(extent);
            model.view.extent = Some(extent);
            changer.emit(ModelChange::ExtentChanged { extent });
            (model, None)
        }

        Command::ChangeViewport { size } => {
            renderer.set_viewport(size);
            model.view.size = Some(size);
            changer.emit(ModelChange::ViewportChanged { size });
            (model, None)
        }

        Command::FocusOnMap => {
            model.focused = true;
            renderer.set_focus(true);
            changer.emit(ModelChange::FocusChanged { focused: true });
            (model, None)
        }

        Command::LoseFocusOnMap => {
            model.focused = false;
            renderer.set_focus(false);
            changer.emit(ModelChange::FocusChanged { focused: false });
            (model, None)
        }

        Command::AddInteraction { interaction } => {
            let handle = renderer.add_interaction(&interaction);
            model.interactions.push((interaction, handle));
            (model, None)
        }

        Command::RemoveInteraction { interaction } => {
            // Most recent matching request wins, mirroring removal by
            // object identity in the original protocol.
            match model
                .interactions
                .iter()
                .rposition(|(request, _)| *request == interaction)
            {
                Some(index) => {
                    let (_, handle) = model.interactions.remove(index);
                    renderer.remove_interaction(handle);
                }
                None => {
                    tracing::debug!(?interaction, "remove of unknown interaction ignored");
                }
            }
            (model, None)
        }

        Command::AddStandardInteractions {
            scroll_zoom_on_focus,
            wrapper,
        } => {
            let outcome = if model.std_interactions.is_empty() {
                model.std_interactions = renderer.add_standard_interactions(scroll_zoom_on_focus);
                model.scroll_zoom_on_focus = scroll_zoom_on_focus;
                Ok(())
            } else {
                fail("standaard interacties zijn al actief")
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::RemoveStandardInteractions { wrapper } => {
            let outcome = if model.std_interactions.is_empty() {
                fail("standaard interacties zijn niet actief")
            } else {
                for handle in model.std_interactions.drain(..) {
                    renderer.remove_interaction(handle);
                }
                Ok(())
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::AddOverlay { overlay } => {
            add_overlay(&mut model, renderer, overlay);
            (model, None)
        }

        Command::RemoveOverlays { ids } => {
            for id in &ids {
                if let Some(handle) = model.overlays.remove(id) {
                    renderer.remove_overlay(handle);
                }
            }
            (model, None)
        }

        Command::SetSelectionMode { mode } => {
            model.selection_mode = mode;
            renderer.set_selection_mode(mode);
            changer.emit(ModelChange::SelectionModeChanged { mode });
            (model, None)
        }

        Command::DeselectFeature { id } => {
            renderer.deselect_feature(&id);
            (model, None)
        }

        Command::RequestScale { wrapper } => {
            // Chrome ownership stays with the host; acknowledging is
            // all the core has to do.
            tracing::debug!("scale requested");
            let msg = wrapper.wrap(Ok(()));
            (model, Some(msg))
        }

        Command::AddScaleControl { wrapper } => {
            let outcome = if model.scale.is_none() {
                model.scale = Some(renderer.add_scale_control());
                Ok(())
            } else {
                fail("schaal is al aanwezig")
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::RemoveScaleControl { wrapper } => {
            let outcome = match model.scale.take() {
                Some(handle) => {
                    renderer.remove_control(handle);
                    Ok(())
                }
                None => fail("geen schaal aanwezig"),
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::AddFullscreenControl { wrapper } => {
            let outcome = if model.fullscreen.is_none() {
                model.fullscreen = Some(renderer.add_fullscreen_control());
                Ok(())
            } else {
                fail("volledig scherm is al aanwezig")
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::RemoveFullscreenControl { wrapper } => {
            let outcome = match model.fullscreen.take() {
                Some(handle) => {
                    renderer.remove_control(handle);
                    Ok(())
                }
                None => fail("geen volledig scherm aanwezig"),
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::ShowBackgroundChooser { wrapper } => {
            model.show_background_selector = true;
            // Re-publish current selection state so a freshly shown
            // chooser starts from the truth: the registry has no replay.
            model
                .subscriptions
                .publish(&InternalSubMsg::BackgroundLayersSet {
                    layers: model.possible_backgrounds.clone(),
                });
            if let Some(title) = &model.background_title {
                model
                    .subscriptions
                    .publish(&InternalSubMsg::BackgroundTitleSet {
                        title: title.clone(),
                    });
            }
            let msg = wrapper.wrap(Ok(()));
            (model, Some(msg))
        }

        Command::HideBackgroundChooser { wrapper } => {
            model.show_background_selector = false;
            let msg = wrapper.wrap(Ok(()));
            (model, Some(msg))
        }

        Command::ChooseBackground { title, wrapper } => {
            let outcome = choose_background(&mut model, renderer, &title);
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::AddSearcher { searcher, wrapper } => {
            let name = searcher.name().to_string();
            let outcome = if model.searchers.iter().any(|s| s.name() == name) {
                fail(format!("er is al een zoeker met naam '{name}'"))
            } else {
                model.searchers.push(searcher);
                Ok(())
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::RemoveSearcher { name, wrapper } => {
            let outcome = match model.searchers.iter().position(|s| s.name() == name) {
                Some(index) => {
                    model.searchers.remove(index);
                    Ok(())
                }
                None => fail(format!("geen zoeker met naam '{name}'")),
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::Search {
            input,
            searchers,
            wrapper,
        } => {
            let unknown: Vec<String> = searchers
                .iter()
                .filter(|name| !model.searchers.iter().any(|s| s.name() == **name))
                .map(|name| format!("geen zoeker met naam '{name}'"))
                .collect();
            let outcome = if unknown.is_empty() {
                for searcher in model
                    .searchers
                    .iter()
                    .filter(|s| searchers.contains(s.name()))
                {
                    searcher.search(&input, model.search_sink.clone());
                }
                Ok(())
            } else {
                Err(crate::validation::Failure::from_messages(unknown))
            };
            let msg = wrapper.wrap(outcome);
            (model, Some(msg))
        }

        Command::SearchResultClicked { result } => {
            model
                .subscriptions
                .publish(&InternalSubMsg::SearchResultClicked { result });
            (model, None)
        }

        Command::ReportComponentError { errors } => {
            // Environment errors get the same treatment as any other
            // fire-and-forget command: recorded, never fatal.
            tracing::error!(errors = ?errors, "component error reported");
            (model, None)
        }

        Command::SetMyLocationZoom { target } => {
            model.my_location_zoom = target;
            (model, None)
        }

        Command::AddUiElement { name } => {
            if model.ui_elements.insert(name.clone()) {
                changer.emit(ModelChange::UiElementToggled {
                    name,
                    enabled: true,
                });
            }
            (model, None)
        }

        Command::RemoveUiElement { name } => {
            if model.ui_elements.remove(&name) {
                model.ui_element_options.remove(&name);
                changer.emit(ModelChange::UiElementToggled {
                    name,
                    enabled: false,
                });
            }
            (model, None)
        }

        Command::SetUiElementOptions { name, options } => {
            model.ui_element_options.insert(name, options);
            (model, None)
        }

        Command::ShowInfoMessage { message } => {
            show_info_message(&mut model, message);
            (model, None)
        }

        Command::HideInfoMessage { id } => {
            model.info_messages.remove(&id);
            (model, None)
        }

        Command::CloseInfoMessage { id, msg_gen } => {
            model.info_messages.remove(&id);
            let msg = msg_gen();
            (model, msg)
        }

        Command::ToggleMeasuring { active } => {
            model.measuring = active;
            model
                .subscriptions
                .publish(&InternalSubMsg::MeasuringToggled { active });
            (model, None)
        }

        Command::ToggleDrawing { active } => {
            model.drawing = active;
            model
                .subscriptions
                .publish(&InternalSubMsg::DrawingToggled { active });
            (model, None)
        }

        Command::PublishGeometry { geometry } => {
            model
                .subscriptions
                .publish(&InternalSubMsg::GeometryChanged { geometry });
            (model, None)
        }

        Command::AbortTileLoading => {
            renderer.abort_tile_loading();
            (model, None)
        }
    }
}

fn add_layer(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    position: usize,
    layer: Layer,
    visible: bool,
    group: LayerGroup,
) -> Validation<()> {
    if model.has_layer(&layer.title) {
        return fail(format!("er is al een laag met titel '{}'", layer.title));
    }
    let position = position.min(model.layers.len());

    // The first background layer becomes the active one; later
    // candidates start hidden until chosen.
    let is_background = group == LayerGroup::Background && layer.background_capable();
    let visible = if is_background {
        model.background_title.is_none()
    } else {
        visible
    };

    let handle = renderer.add_layer(&layer, position, visible);
    model.title_index.insert(layer.title.clone(), handle);

    if is_background {
        model.possible_backgrounds.push(layer.clone());
        model
            .subscriptions
            .publish(&InternalSubMsg::BackgroundLayersSet {
                layers: model.possible_backgrounds.clone(),
            });
        if model.background_title.is_none() {
            model.background_title = Some(layer.title.clone());
            model
                .subscriptions
                .publish(&InternalSubMsg::BackgroundTitleSet {
                    title: layer.title.clone(),
                });
        }
    }

    model.layers.insert(
        position,
        LayerEntry {
            layer,
            group,
            visible,
            handle,
        },
    );
    Ok(())
}

fn remove_layer(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    title: &str,
) -> Validation<()> {
    let Some(position) = model.layer_position(title) else {
        return fail(format!("geen laag met titel '{title}'"));
    };
    let entry = model.layers.remove(position);
    renderer.remove_layer(entry.handle);
    model.title_index.remove(title);

    let candidates_before = model.possible_backgrounds.len();
    model.possible_backgrounds.retain(|layer| layer.title != title);
    if model.possible_backgrounds.len() < candidates_before {
        model
            .subscriptions
            .publish(&InternalSubMsg::BackgroundLayersSet {
                layers: model.possible_backgrounds.clone(),
            });
    }
    if model.background_title.as_deref() == Some(title) {
        model.background_title = None;
    }
    Ok(())
}

fn move_layer(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    title: &str,
    to_position: usize,
) -> Validation<()> {
    let Some(from) = model.layer_position(title) else {
        return fail(format!("geen laag met titel '{title}'"));
    };
    let to = to_position.min(model.layers.len().saturating_sub(1));
    let entry = model.layers.remove(from);
    renderer.move_layer(entry.handle, to);
    model.layers.insert(to, entry);
    Ok(())
}

fn replace_features(
    model: &KaartModel,
    renderer: &mut dyn MapRenderer,
    title: &str,
    features: &[Feature],
) -> Validation<()> {
    // Policy: replacing features on an unknown layer fails validation,
    // consistent with the other title-keyed commands.
    match model.title_index.get(title) {
        Some(handle) => {
            renderer.replace_features(*handle, features);
            Ok(())
        }
        None => fail(format!("geen laag met titel '{title}'")),
    }
}

fn set_layer_visible(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    title: &str,
    visible: bool,
) -> Validation<()> {
    let Some(position) = model.layer_position(title) else {
        return fail(format!("geen laag met titel '{title}'"));
    };
    let entry = &mut model.layers[position];
    entry.visible = visible;
    renderer.set_layer_visible(entry.handle, visible);
    Ok(())
}

fn set_layer_style(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    title: &str,
    style: StyleSelector,
    selection_style: Option<StyleSelector>,
) -> Validation<()> {
    let Some(position) = model.layer_position(title) else {
        return fail(format!("geen laag met titel '{title}'"));
    };
    let entry = &mut model.layers[position];
    renderer.set_layer_style(entry.handle, &style, selection_style.as_ref());
    if let crate::element::LayerKind::Vector(settings) = &mut entry.layer.kind {
        settings.style = Some(style);
    }
    Ok(())
}

fn change_zoom(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    changer: &ModelChanger,
    zoom: f64,
) -> Validation<()> {
    let view = &mut model.view;
    if zoom < view.min_zoom || zoom > view.max_zoom {
        return fail(format!(
            "zoom {zoom} ligt buiten de grenzen [{}, {}]",
            view.min_zoom, view.max_zoom
        ));
    }
    view.zoom = Some(zoom);
    renderer.set_zoom(zoom);
    changer.emit(ModelChange::ZoomSettingsChanged {
        zoom,
        min_zoom: view.min_zoom,
        max_zoom: view.max_zoom,
    });
    Ok(())
}

fn choose_background(
    model: &mut KaartModel,
    renderer: &mut dyn MapRenderer,
    title: &str,
) -> Validation<()> {
    if !model
        .possible_backgrounds
        .iter()
        .any(|layer| layer.title == title)
    {
        return fail(format!("'{title}' is geen mogelijke achtergrondlaag"));
    }
    model.background_title = Some(title.to_string());
    model.show_background_selector = false;
    for entry in model
        .layers
        .iter_mut()
        .filter(|entry| entry.group == LayerGroup::Background)
    {
        let visible = entry.layer.title == title;
        entry.visible = visible;
        renderer.set_layer_visible(entry.handle, visible);
    }
    model
        .subscriptions
        .publish(&InternalSubMsg::BackgroundTitleSet {
            title: title.to_string(),
        });
    Ok(())
}

fn add_overlay(model: &mut KaartModel, renderer: &mut dyn MapRenderer, overlay: Overlay) {
    let handle = renderer.add_overlay(&overlay);
    if let Some(previous) = model.overlays.insert(overlay.id.clone(), handle) {
        renderer.remove_overlay(previous);
    }
}

fn show_info_message(model: &mut KaartModel, message: InfoMessage) {
    model.info_messages.insert(message.id.clone(), message);
}
