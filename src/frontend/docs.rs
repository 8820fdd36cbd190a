use super::browser::document;
use crate::menu::{MenuTree, ResolvedNode};
use crate::page::{section_of, PagePayload};
use gloo_net::http::Request;
use js_sys::encode_uri_component;
use serde::de::DeserializeOwned;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

const SITE_NAME: &str = "Tokio";

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Option<T> {
    let response = Request::get(url).send().await.ok()?;
    if !response.ok() {
        return None;
    }
    response.json::<T>().await.ok()
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            encode_uri_component(segment)
                .as_string()
                .unwrap_or_else(|| segment.to_string())
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Loaded(PagePayload),
    Missing,
}

#[derive(Properties, PartialEq)]
struct NavMenuProps {
    menu: MenuTree,
    path: AttrValue,
}

fn render_node(node: &ResolvedNode<'_>, current: Option<&str>) -> Html {
    let is_current = current == Some(node.node.href.as_str());

    html! {
        <li
            key={node.node.key.clone()}
            class={classes!(
                node.node.is_group().then_some("menu-group"),
                node.active.then_some("active"),
                node.expanded.then_some("expanded"),
            )}
        >
            if node.node.has_page {
                <a
                    href={node.node.href.clone()}
                    aria-current={is_current.then_some("page")}
                >
                    {node.node.title.clone()}
                </a>
            } else {
                <span class="menu-label">{node.node.title.clone()}</span>
            }
            if node.expanded {
                <ul>
                    { for node.children.iter().map(|child| render_node(child, current)) }
                </ul>
            }
        </li>
    }
}

/// Section sidebar. On narrow screens it collapses behind a toggle.
#[function_component(NavMenu)]
fn nav_menu(props: &NavMenuProps) -> Html {
    let open = use_state(|| false);
    let on_toggle = {
        let open = open.clone();
        Callback::from(move |_| open.set(!*open))
    };
    let resolved = props.menu.resolve(&props.path);
    let current = props.menu.find(&props.path).map(|node| node.href.as_str());

    html! {
        <nav class={classes!("docs-menu", (*open).then_some("is-open"))} aria-label="Documentation">
            <button
                class="docs-menu-toggle"
                type="button"
                aria-expanded={(*open).to_string()}
                onclick={on_toggle}
            >
                {"Menu"}
            </button>
            <ul class="docs-menu-tree">
                { for resolved.iter().map(|node| render_node(node, current)) }
            </ul>
        </nav>
    }
}

#[derive(Properties, PartialEq)]
struct ArticleProps {
    page: PagePayload,
}

#[function_component(Article)]
fn article(props: &ArticleProps) -> Html {
    let page = &props.page;
    let body = Html::from_html_unchecked(AttrValue::from(page.body_html.clone()));
    let toc = page
        .headings
        .iter()
        .filter_map(|heading| heading.id.as_ref().map(|id| (heading, id)))
        .collect::<Vec<_>>();

    html! {
        <>
            <article class="docs-article">
                <h1>{page.title.clone()}</h1>
                if let Some(description) = page.description.clone() {
                    <p class="docs-lead">{description}</p>
                }
                <div class="docs-body">{body}</div>
                <nav class="docs-pager" aria-label="Pagination">
                    if let Some(prev) = page.prev.clone() {
                        <a class="docs-prev" href={prev.href}>{"← "}{prev.title}</a>
                    }
                    if let Some(next) = page.next.clone() {
                        <a class="docs-next" href={next.href}>{next.title}{" →"}</a>
                    }
                </nav>
            </article>
            if !toc.is_empty() {
                <aside class="docs-toc" aria-label="On this page">
                    <p class="docs-toc-title">{"On this page"}</p>
                    <ul>
                        { for toc.iter().map(|(heading, id)| html! {
                            <li key={(*id).clone()} class={format!("toc-level-{}", heading.level)}>
                                <a href={format!("#{id}")}>{heading.text.clone()}</a>
                            </li>
                        }) }
                    </ul>
                </aside>
            }
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct DocsPageProps {
    pub path: AttrValue,
}

#[function_component(DocsPage)]
pub fn docs_page(props: &DocsPageProps) -> Html {
    let page = use_state(|| PageState::Loading);
    let menu = use_state(|| None::<MenuTree>);

    {
        let page = page.clone();
        let menu = menu.clone();
        use_effect_with(props.path.clone(), move |path| {
            let path = path.to_string();
            page.set(PageState::Loading);

            spawn_local(async move {
                let section = section_of(&path).to_string();
                let menu_url = format!("/api/menu/{}", encode_path(&section));
                let page_url = format!("/api/page/{}", encode_path(&path));

                menu.set(fetch_json::<MenuTree>(&menu_url).await);
                match fetch_json::<PagePayload>(&page_url).await {
                    Some(payload) => {
                        if let Some(document) = document() {
                            document.set_title(&format!("{} | {SITE_NAME}", payload.title));
                        }
                        page.set(PageState::Loaded(payload));
                    }
                    None => page.set(PageState::Missing),
                }
            });
            || ()
        });
    }

    html! {
        <div class="docs-layout">
            if let Some(menu) = (*menu).clone() {
                <NavMenu menu={menu} path={props.path.clone()} />
            }
            {
                match (*page).clone() {
                    PageState::Loading => html! { <p class="docs-status">{"Loading…"}</p> },
                    PageState::Missing => html! {
                        <div class="docs-status">
                            <h1>{"Page not found"}</h1>
                            <p><a href="/">{"Back to the home page"}</a></p>
                        </div>
                    },
                    PageState::Loaded(payload) => html! { <Article page={payload} /> },
                }
            }
        </div>
    }
}
