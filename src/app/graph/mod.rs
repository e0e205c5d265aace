mod interaction;
mod minimap;
mod view;
