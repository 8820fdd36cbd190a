use super::browser::{document, DomLayerTarget, WindowListener};
use crate::stack::{FocusBand, Highlighter, STACK_LAYERS};
use std::{cell::RefCell, rc::Rc};
use yew::prelude::*;

struct Adopter {
    name: &'static str,
    logo: &'static str,
    href: &'static str,
}

const ADOPTERS: &[Adopter] = &[
    Adopter {
        name: "AWS",
        logo: "/img/logos/aws.svg",
        href: "https://aws.amazon.com",
    },
    Adopter {
        name: "Azure",
        logo: "/img/logos/azure.svg",
        href: "https://azure.microsoft.com",
    },
    Adopter {
        name: "Discord",
        logo: "/img/logos/discord.svg",
        href: "https://discord.com",
    },
    Adopter {
        name: "Dropbox",
        logo: "/img/logos/dropbox.svg",
        href: "https://www.dropbox.com",
    },
    Adopter {
        name: "Facebook",
        logo: "/img/logos/facebook.svg",
        href: "https://www.facebook.com",
    },
    Adopter {
        name: "Fly.io",
        logo: "/img/logos/fly.svg",
        href: "https://fly.io",
    },
    Adopter {
        name: "Linkerd",
        logo: "/img/logos/linkerd.svg",
        href: "https://linkerd.io",
    },
    Adopter {
        name: "Vector",
        logo: "/img/logos/vector.svg",
        href: "https://vector.dev",
    },
];

struct Feature {
    title: &'static str,
    body: &'static str,
}

const FEATURES: &[Feature] = &[
    Feature {
        title: "Reliable",
        body: "The ownership model and type system let you build concurrent code without \
               fear of data races or use-after-free bugs.",
    },
    Feature {
        title: "Fast",
        body: "Zero-cost abstractions give bare-metal performance, and the scheduler is built \
               to spread work across all cores.",
    },
    Feature {
        title: "Flexible",
        body: "From large servers with dozens of cores to small embedded devices, the runtime \
               fits the needs of the application.",
    },
];

#[function_component(Hero)]
fn hero() -> Html {
    html! {
        <section class="hero" aria-labelledby="hero-heading">
            <h1 id="hero-heading">
                {"Build reliable network applications without compromising speed."}
            </h1>
            <p class="hero-lead">
                {"An asynchronous runtime for the Rust programming language. It provides the \
                  building blocks needed for writing network applications."}
            </p>
            <div class="hero-actions">
                <a class="button button-primary" href="/tokio/tutorial">{"Get started"}</a>
                <a class="button" href="https://docs.rs/tokio" target="_blank" rel="noopener noreferrer">
                    {"API docs"}
                </a>
            </div>
        </section>
    }
}

#[function_component(FeatureGrid)]
fn feature_grid() -> Html {
    html! {
        <section class="features" aria-label="Highlights">
            { for FEATURES.iter().map(|feature| html! {
                <div class="feature" key={feature.title}>
                    <h2>{feature.title}</h2>
                    <p>{feature.body}</p>
                </div>
            }) }
        </section>
    }
}

#[function_component(LogoGrid)]
fn logo_grid() -> Html {
    html! {
        <section class="logo-grid" aria-labelledby="adopters-heading">
            <h2 id="adopters-heading">{"Built by the community, for the community"}</h2>
            <ul>
                { for ADOPTERS.iter().map(|adopter| html! {
                    <li key={adopter.name}>
                        <a href={adopter.href} target="_blank" rel="noopener noreferrer">
                            <img src={adopter.logo} alt={adopter.name} loading="lazy" />
                        </a>
                    </li>
                }) }
            </ul>
        </section>
    }
}

/// Illustration, sidebar and panels for each stack layer. The highlighter is
/// attached after the first render so every element id already exists.
#[function_component(StackSection)]
fn stack_section() -> Html {
    use_effect_with((), |_| {
        let highlighter = document().map(|document| {
            Rc::new(RefCell::new(Highlighter::new(STACK_LAYERS, |layer| {
                DomLayerTarget::locate(&document, layer)
            })))
        });

        let listeners = highlighter
            .filter(|highlighter| !highlighter.borrow().is_empty())
            .map(|highlighter| {
                highlighter.borrow_mut().recompute(FocusBand::default());

                ["scroll", "resize"]
                    .into_iter()
                    .filter_map(|event| {
                        let highlighter = highlighter.clone();
                        WindowListener::add(event, move |_| {
                            highlighter.borrow_mut().recompute(FocusBand::default());
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        move || drop(listeners)
    });

    html! {
        <section class="tk-stack" aria-labelledby="stack-heading">
            <h2 id="stack-heading" class="sr-only">{"The stack"}</h2>
            <div class="tk-stack-illustration" aria-hidden="true">
                { for STACK_LAYERS.iter().map(|layer| html! {
                    <img
                        key={layer.id}
                        id={layer.image_id()}
                        class={classes!("tk-stack-img", layer.css_class())}
                        src={format!("/img/stack-{}.svg", layer.id)}
                        style={format!("z-index: {};", layer.z_index)}
                        alt=""
                    />
                }) }
            </div>
            <nav class="tk-stack-menu" aria-label="Stack layers">
                <ul>
                    { for STACK_LAYERS.iter().map(|layer| html! {
                        <li key={layer.id}>
                            <a id={layer.menu_link_id()} href={format!("#{}", layer.panel_id())}>
                                {layer.menu_label()}
                            </a>
                        </li>
                    }) }
                </ul>
            </nav>
            <div class="tk-stack-panels">
                { for STACK_LAYERS.iter().map(|layer| html! {
                    <div key={layer.id} id={layer.panel_id()} class={classes!("tk-lib", layer.css_class())}>
                        <h3>{layer.name}</h3>
                        <p>{layer.description}</p>
                        if let Some(link) = layer.link {
                            <a class="link" href={link}>{"Learn more ➔"}</a>
                        }
                    </div>
                }) }
            </div>
        </section>
    }
}

#[function_component(Landing)]
pub fn landing() -> Html {
    html! {
        <>
            <Hero />
            <FeatureGrid />
            <StackSection />
            <LogoGrid />
        </>
    }
}
